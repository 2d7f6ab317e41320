/// Session zone string for a client-side minute offset.
///
/// Browsers report `getTimezoneOffset()`, which is positive west of UTC, so the
/// sign is inverted: `90` becomes `-1:30` and `-90` becomes `+1:30`. Zero is
/// `+0:00`.
#[must_use]
pub fn session_zone_for_offset(minutes: i32) -> String {
    let magnitude = minutes.unsigned_abs();
    let sign = if minutes > 0 { '-' } else { '+' };
    format!("{sign}{}:{:02}", magnitude / 60, magnitude % 60)
}
