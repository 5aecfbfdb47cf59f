//! Host value → depth strength mappings

const WRAPPER_RAW_MAX: i32 = 32767;
const WRAPPER_SPAN: f32 = 600.0;
const WRAPPER_MIN: i32 = 200;
const WRAPPER_MAX: i32 = 800;

/// Pass a host strength straight through, saturating into `i16`
pub fn direct_depth_strength(raw: i32) -> i16 {
    i16::try_from(raw).unwrap_or(if raw < 0 { i16::MIN } else { i16::MAX })
}

/// Map a legacy 0..=32767 control onto the 200..=800 strength window
pub fn wrapper_compat_depth_strength(raw: i32) -> i16 {
    let raw = raw.clamp(0, WRAPPER_RAW_MAX);
    let scaled = (raw as f32 / WRAPPER_RAW_MAX as f32 * WRAPPER_SPAN + WRAPPER_MIN as f32).floor();
    let strength = (scaled as i32).clamp(WRAPPER_MIN, WRAPPER_MAX);
    direct_depth_strength(strength)
}
