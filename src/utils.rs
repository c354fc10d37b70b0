use std::time::Duration;

pub fn format_human_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let millis = elapsed.subsec_millis();
    if secs >= 3600 {
        let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
        format!("{hours}:{minutes:02}:{seconds:02}.{millis:03} (h:mm:ss.mmm)")
    } else if secs >= 60 {
        let (minutes, seconds) = (secs / 60, secs % 60);
        format!("{minutes}:{seconds:02}.{millis:03} (m:ss.mmm)")
    } else {
        format!("{secs}.{millis:03} seconds")
    }
}
