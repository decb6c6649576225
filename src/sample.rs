//! Sample types and the quantization rules used by the WAV codec.
//!
//! The pipeline processes amplitudes as `f32` in the nominal range
//! `[-1.0, 1.0]` and quantizes to 16-bit PCM only at the container boundary.
//! Quantization is asymmetric, matching the int16 value range: negative
//! amplitudes scale by 32768 and non-negative ones by 32767, so exactly
//! `-1.0` encodes to `i16::MIN` and exactly `1.0` to `i16::MAX`. Values
//! outside the nominal range are hard-clamped first, never wrapped.

use std::fmt::Debug;

/// Core trait implemented by every sample type the codec understands.
pub trait Sample: Copy + PartialOrd + Debug + Send + Sync + 'static {
    /// Full-scale positive value for this type.
    const MAX: Self;
    /// Full-scale negative value for this type.
    const MIN: Self;
    /// Bits per encoded sample.
    const BITS: u8;
}

impl Sample for i16 {
    const MAX: Self = i16::MAX;
    const MIN: Self = i16::MIN;
    const BITS: u8 = 16;
}

impl Sample for f32 {
    const MAX: Self = 1.0;
    const MIN: Self = -1.0;
    const BITS: u8 = 32;
}

impl Sample for f64 {
    const MAX: Self = 1.0;
    const MIN: Self = -1.0;
    const BITS: u8 = 64;
}

/// Scaled, clamping conversion between sample representations.
///
/// Unlike a plain numeric cast this preserves perceived amplitude:
/// `0.5f32` converts to roughly half of `i16::MAX`, not to `0i16`.
pub trait ConvertTo<O: Sample> {
    /// Converts `self` into the target sample type.
    fn convert_to(&self) -> O;
}

macro_rules! impl_identity_conversion {
    ($ty:ty) => {
        impl ConvertTo<$ty> for $ty {
            #[inline(always)]
            fn convert_to(&self) -> $ty {
                *self
            }
        }
    };
}

macro_rules! impl_float_to_int_conversion {
    ($from:ty, $to:ty) => {
        impl ConvertTo<$to> for $from {
            #[inline(always)]
            fn convert_to(&self) -> $to {
                let clamped = self.clamp(-1.0, 1.0);
                if clamped < 0.0 {
                    (clamped * (-(<$to>::MIN as $from))).round() as $to
                } else {
                    (clamped * (<$to>::MAX as $from)).round() as $to
                }
            }
        }
    };
}

macro_rules! impl_int_to_float_conversion {
    ($from:ty, $to:ty) => {
        impl ConvertTo<$to> for $from {
            #[inline(always)]
            fn convert_to(&self) -> $to {
                if *self < 0 {
                    (*self as $to) / (-(<$from>::MIN as $to))
                } else {
                    (*self as $to) / (<$from>::MAX as $to)
                }
            }
        }
    };
}

macro_rules! impl_float_to_float_conversion {
    ($from:ty, $to:ty) => {
        impl ConvertTo<$to> for $from {
            #[inline(always)]
            fn convert_to(&self) -> $to {
                *self as $to
            }
        }
    };
}

impl_identity_conversion!(i16);
impl_identity_conversion!(f32);
impl_identity_conversion!(f64);

impl_float_to_int_conversion!(f32, i16);
impl_float_to_int_conversion!(f64, i16);

impl_int_to_float_conversion!(i16, f32);
impl_int_to_float_conversion!(i16, f64);

impl_float_to_float_conversion!(f32, f64);
impl_float_to_float_conversion!(f64, f32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_scale_floats_hit_the_int16_rails() {
        assert_eq!(ConvertTo::<i16>::convert_to(&1.0f32), 32767);
        assert_eq!(ConvertTo::<i16>::convert_to(&-1.0f32), -32768);
        assert_eq!(ConvertTo::<i16>::convert_to(&0.0f32), 0);
    }

    #[test]
    fn out_of_range_floats_clamp_instead_of_wrapping() {
        assert_eq!(ConvertTo::<i16>::convert_to(&1.5f32), 32767);
        assert_eq!(ConvertTo::<i16>::convert_to(&-2.0f32), -32768);
        assert_eq!(ConvertTo::<i16>::convert_to(&f32::INFINITY), 32767);
    }

    #[test]
    fn int16_to_float_round_trips_the_rails() {
        let max: f32 = ConvertTo::<f32>::convert_to(&i16::MAX);
        let min: f32 = ConvertTo::<f32>::convert_to(&i16::MIN);
        assert_eq!(max, 1.0);
        assert_eq!(min, -1.0);
    }

    #[test]
    fn half_scale_is_preserved_approximately() {
        let half: i16 = ConvertTo::<i16>::convert_to(&0.5f32);
        assert!((half as i32 - 16384).abs() <= 1);
    }
}
