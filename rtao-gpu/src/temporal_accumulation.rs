use glam::UVec2;

use crate::{lerp, BilinearFilter, Reprojection};

/// Cap of the history-length counter.
pub const HISTORY_LENGTH_MAX: f32 = 8.0;

/// Largest weight that history is allowed to have over the new sample.
pub const ALPHA_MAX: f32 = 0.5;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TemporalSample {
    pub color: f32,
    pub history_length: f32,
}

/// Clamps the blend factor into `<0.0, ALPHA_MAX>`; NaN becomes zero.
pub fn clamp_alpha(alpha: f32) -> f32 {
    if alpha.is_nan() {
        0.0
    } else {
        alpha.clamp(0.0, ALPHA_MAX)
    }
}

/// Mixes the new sample with history; `alpha` is the history's weight.
pub fn blend(raw: f32, history: f32, alpha: f32) -> f32 {
    lerp(raw, history, clamp_alpha(alpha))
}

pub fn next_history_length(prev: f32) -> f32 {
    (prev + 1.0).min(HISTORY_LENGTH_MAX)
}

/// Blends the current frame's raw occlusion with the reprojected history.
///
/// History is dropped (and its length reset) when the reprojection is
/// invalid or when none of its accepted taps carries any bilinear weight.
/// A history length of zero marks a freshly cleared slot, in which case the
/// raw sample is taken as-is but the pixel starts accumulating.
pub fn accumulate(
    raw: f32,
    reprojection: Reprojection,
    alpha: f32,
    prev_color: impl Fn(UVec2) -> f32,
    prev_history_length: impl Fn(UVec2) -> f32,
) -> TemporalSample {
    let discarded = TemporalSample {
        color: raw,
        history_length: 0.0,
    };

    if reprojection.is_none() {
        return discarded;
    }

    let uv = reprojection.prev_pos_fract();
    let color = BilinearFilter::from_reprojection(reprojection, prev_color);

    if color.weight_sum(uv) <= 0.0 {
        return discarded;
    }

    let history_length =
        BilinearFilter::from_reprojection(reprojection, prev_history_length)
            .eval(uv)
            .round();

    // A length of zero is stored both by the history clear and by
    // disocclusions, so such history is never blended in; the pixel starts
    // over from the raw sample, which gets blended from the next frame on
    if history_length < 1.0 {
        return TemporalSample {
            color: raw,
            history_length: next_history_length(0.0),
        };
    }

    TemporalSample {
        color: blend(raw, color.eval(uv), alpha),
        history_length: next_history_length(history_length),
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn valid() -> Reprojection {
        Reprojection {
            prev_x: 2.0,
            prev_y: 2.0,
            validity: 0b1111,
        }
    }

    #[test]
    fn alpha_is_clamped() {
        assert_eq!(0.0, clamp_alpha(-1.0));
        assert_eq!(0.25, clamp_alpha(0.25));
        assert_eq!(0.5, clamp_alpha(0.9));
        assert_eq!(0.0, clamp_alpha(f32::NAN));
    }

    #[test]
    fn zero_alpha_reproduces_raw() {
        let target = accumulate(0.3, valid(), 0.0, |_| 0.9, |_| 4.0);

        assert_eq!(0.3, target.color);
        assert_eq!(5.0, target.history_length);
    }

    #[test]
    fn half_alpha_weights_equally() {
        let target = accumulate(0.2, valid(), 0.5, |_| 0.8, |_| 4.0);

        assert_relative_eq!(target.color, 0.5);
    }

    #[test]
    fn history_length_saturates() {
        let mut history_length = 0.0;

        for expected in [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 8.0, 8.0] {
            let prev = history_length;

            history_length =
                accumulate(1.0, valid(), 0.5, |_| 1.0, move |_| prev)
                    .history_length;

            assert_eq!(expected, history_length);
        }
    }

    #[test]
    fn invalid_reprojection_resets() {
        let target =
            accumulate(0.4, Reprojection::none(), 0.5, |_| 1.0, |_| 6.0);

        assert_eq!(
            TemporalSample {
                color: 0.4,
                history_length: 0.0,
            },
            target
        );
    }

    #[test]
    fn disoccluded_pixel_restarts_accumulation() {
        let disoccluded =
            accumulate(0.2, Reprojection::none(), 0.5, |_| 0.9, |_| 6.0);

        let restarted = accumulate(
            0.6,
            valid(),
            0.5,
            |_| disoccluded.color,
            |_| disoccluded.history_length,
        );

        assert_eq!(0.6, restarted.color);
        assert_eq!(1.0, restarted.history_length);

        let blended = accumulate(
            1.0,
            valid(),
            0.5,
            |_| restarted.color,
            |_| restarted.history_length,
        );

        assert_relative_eq!(blended.color, 0.8);
        assert_eq!(2.0, blended.history_length);
    }

    #[test]
    fn cleared_history_is_ignored() {
        let target = accumulate(0.7, valid(), 0.5, |_| 0.0, |_| 0.0);

        assert_eq!(0.7, target.color);
        assert_eq!(1.0, target.history_length);
    }
}
