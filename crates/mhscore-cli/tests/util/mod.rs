//! Shared fixtures for the CLI integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

const HEADER: &str = "Age,Gender,Anxiety,Depression,Sleep Issuess,Social Withdrawal,\
Stress Level,Work Study Pressure,Family History,Physical Activity,Social Support,Score";

/// Answer patterns cycled through by `write_survey`, with their scores.
const PATTERNS: [(&str, u32); 8] = [
    ("Male,No,No,No,No,Low,Low,No,High,High", 0),
    ("Female,Yes,No,No,No,Low,Medium,No,Medium,High", 1),
    ("Other,Yes,Yes,No,No,Medium,Low,Yes,Low,Medium", 2),
    ("Male,Yes,No,Yes,No,High,Medium,No,Medium,Medium", 3),
    ("Female,Yes,Yes,Yes,No,Medium,High,Yes,Low,Medium", 4),
    ("Other,Yes,Yes,No,Yes,High,High,No,Low,Low", 5),
    ("Female,Yes,Yes,Yes,Yes,High,High,Yes,Low,Low", 6),
    ("Male,No,Yes,No,No,Low,Medium,No,High,Medium", 1),
];

pub fn write_survey(dir: &Path, rows: usize) -> PathBuf {
    let mut csv = format!("{}\n", HEADER);
    for i in 0..rows {
        let (answers, score) = PATTERNS[i % PATTERNS.len()];
        csv.push_str(&format!("{},{},{}\n", 18 + (i * 5) % 40, answers, score));
    }
    let path = dir.join("mental_health_data.csv");
    std::fs::write(&path, csv).expect("write survey fixture");
    path
}

/// Records to score in batch mode: one complete, one missing age, one
/// missing a required column.
pub fn write_inference_records(dir: &Path) -> PathBuf {
    let csv = "AGE,GENDER,ANXIETY,DEPRESSION,SLEEP_ISSUES,SOCIAL_WITHDRAWAL,STRESS_LEVEL,\
WORK_STUDY_PRESSURE,FAMILY_HISTORY,PHYSICAL_ACTIVITY,SOCIAL_SUPPORT\n\
25,Female,Yes,No,Sometimes,No,Medium,High,No,Regular,Medium\n\
,NonBinary,Yes,Yes,Yes,Yes,High,High,Yes,Low,Low\n\
40,Male,No,No,No,No,Low,Low,No,High,\n";
    let path = dir.join("records.csv");
    std::fs::write(&path, csv).expect("write inference fixture");
    path
}
