use crate::gain::gain_to_db;
use crate::models::{BatchReport, FailureStage};

/// Format a duration in seconds as "M:SS".
pub fn format_duration(secs: f64) -> String {
    let total_secs = secs.round() as u64;
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    format!("{}:{:02}", minutes, seconds)
}

/// Format a level in dB, spelling out silence as `-inf dB`.
pub fn format_db(db: f32) -> String {
    if db == f32::NEG_INFINITY {
        "-inf dB".to_string()
    } else {
        format!("{:.2} dB", db)
    }
}

fn level(linear: f32) -> String {
    format!("{:.4} :: {}", linear, format_db(gain_to_db(linear)))
}

/// Short summary: track count, peak extremes and the applied gain.
pub fn format_summary(report: &BatchReport) -> String {
    let result = &report.result;
    format!(
        "Num Tracks:  {}\n\
         Min Peak At: {}\n\
         Max Peak At: {}\n\
         Added Gain:  {}",
        result.track_count,
        level(result.min_peak),
        level(result.max_peak),
        level(result.applied_gain),
    )
}

/// Summary followed by a per-track table and any failures.
pub fn format_table(report: &BatchReport) -> String {
    let separator = "\u{2500}".repeat(64);
    let mut output = String::new();

    output.push_str(&format_summary(report));
    output.push_str("\n\n");

    output.push_str(&format!(
        "{:>10} {:>10} {:>10} {:>8}  {}\n",
        "Peak", "Output", "Rate", "Duration", "Track"
    ));
    output.push_str(&separator);
    output.push('\n');

    for track in &report.tracks {
        output.push_str(&format!(
            "{:>10} {:>10} {:>10} {:>8}  {}\n",
            format_db(gain_to_db(track.peak)),
            format_db(gain_to_db(track.normalized_peak)),
            track.sample_rate,
            format_duration(track.duration_secs),
            track.title,
        ));
        if track.skipped_packets > 0 {
            output.push_str(&format!(
                "{:>41}  ({} malformed packet(s) skipped)\n",
                "", track.skipped_packets
            ));
        }
    }

    output.push_str(&separator);
    output.push('\n');
    output.push_str(&format!(
        "Written: {} -> {}",
        report.written(),
        report.output_dir.display()
    ));

    for failure in &report.failures {
        let stage = match failure.stage {
            FailureStage::Decode => "decode",
            FailureStage::Encode => "encode",
        };
        output.push_str(&format!(
            "\nFailed ({}): {}: {}",
            stage,
            failure.path.display(),
            failure.message
        ));
    }

    output
}

/// Format a batch report as pretty-printed JSON.
pub fn format_json(report: &BatchReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BatchResult, TrackFailure, TrackReport};
    use std::path::PathBuf;

    fn sample_report() -> BatchReport {
        BatchReport {
            result: BatchResult {
                track_count: 2,
                min_peak: 0.25,
                max_peak: 0.5,
                applied_gain: 1.7825,
            },
            output_dir: PathBuf::from("/out"),
            tracks: vec![TrackReport {
                title: "Loud".to_string(),
                source: PathBuf::from("/in/Loud.flac"),
                output: PathBuf::from("/out/Loud.wav"),
                sample_rate: 44100,
                channels: 2,
                duration_secs: 263.0,
                peak: 0.5,
                normalized_peak: 0.8913,
                skipped_packets: 3,
            }],
            failures: vec![TrackFailure {
                path: PathBuf::from("/in/broken.mp3"),
                stage: FailureStage::Decode,
                message: "Unsupported format".to_string(),
            }],
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "0:00");
        assert_eq!(format_duration(61.0), "1:01");
        assert_eq!(format_duration(3661.0), "61:01");
    }

    #[test]
    fn test_format_db() {
        assert_eq!(format_db(-6.0206), "-6.02 dB");
        assert_eq!(format_db(f32::NEG_INFINITY), "-inf dB");
    }

    #[test]
    fn test_summary_has_all_quantities() {
        let summary = format_summary(&sample_report());
        assert!(summary.contains("Num Tracks:  2"));
        assert!(summary.contains("Min Peak At: 0.2500 :: -12.04 dB"));
        assert!(summary.contains("Max Peak At: 0.5000 :: -6.02 dB"));
        assert!(summary.contains("Added Gain:  1.7825 :: 5.02 dB"));
    }

    #[test]
    fn test_summary_silence() {
        let mut report = sample_report();
        report.result.min_peak = 0.0;
        assert!(format_summary(&report).contains("Min Peak At: 0.0000 :: -inf dB"));
    }

    #[test]
    fn test_format_table() {
        let table = format_table(&sample_report());
        assert!(table.contains("Loud"));
        assert!(table.contains("4:23"));
        assert!(table.contains("-1.00 dB"));
        assert!(table.contains("Written: 1 -> /out"));
        assert!(table.contains("Failed (decode): /in/broken.mp3"));
        assert!(table.contains("(3 malformed packet(s) skipped)"));

        let mut clean = sample_report();
        clean.tracks[0].skipped_packets = 0;
        assert!(!format_table(&clean).contains("malformed"));
    }

    #[test]
    fn test_format_json_roundtrip() {
        let json = format_json(&sample_report());
        let parsed: BatchReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.result.track_count, 2);
        assert_eq!(parsed.tracks[0].title, "Loud");
        assert_eq!(parsed.failures[0].stage, FailureStage::Decode);
        assert!(json.contains("\"stage\": \"decode\""));
        assert_eq!(parsed.tracks[0].skipped_packets, 3);
    }
}
