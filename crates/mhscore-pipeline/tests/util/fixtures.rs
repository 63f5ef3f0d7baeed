use std::path::{Path, PathBuf};

use serde_json::{json, Value};

/// Header as found in the raw survey export, including the misspelled
/// sleep column.
pub const HEADER: &str = "Age,Gender,Anxiety,Depression,Sleep Issuess,Social Withdrawal,\
Stress Level,Work Study Pressure,Family History,Physical Activity,Social Support,Score";

/// Deterministic synthetic survey with scores in 0..=6.
///
/// Training labels deliberately omit "Sometimes" (sleep) and "Regular"
/// (activity) so those only exist as supplemental labels.
pub fn survey_csv(rows: usize) -> String {
    let genders = ["Male", "Female", "Other"];
    let yes_no = ["Yes", "No"];
    let levels = ["Low", "Medium", "High"];

    let mut csv = String::from(HEADER);
    csv.push('\n');
    for i in 0..rows {
        let age = 18 + (i * 7) % 45;
        let gender = genders[i % 3];
        let anxiety = yes_no[i % 2];
        let depression = yes_no[(i / 2) % 2];
        let sleep = yes_no[(i / 3) % 2];
        let withdrawal = yes_no[(i / 5) % 2];
        let stress = levels[i % 3];
        let pressure = levels[(i / 2) % 3];
        let family = yes_no[(i / 7) % 2];
        let activity = levels[(i / 4) % 3];
        let support = levels[(i / 3) % 3];

        let score = [anxiety, depression, sleep, withdrawal]
            .iter()
            .filter(|v| **v == "Yes")
            .count()
            + usize::from(stress == "High")
            + usize::from(pressure == "High")
            + usize::from(support == "Low");
        let score = score.min(6);

        csv.push_str(&format!(
            "{age},{gender},{anxiety},{depression},{sleep},{withdrawal},{stress},{pressure},\
{family},{activity},{support},{score}\n"
        ));
    }
    csv
}

#[allow(dead_code)]
pub fn write_survey(dir: &Path, rows: usize) -> PathBuf {
    let path = dir.join("mental_health_data.csv");
    std::fs::write(&path, survey_csv(rows)).expect("write survey fixture");
    path
}

/// The canonical end-to-end request record.
#[allow(dead_code)]
pub fn reference_record() -> Value {
    json!({
        "AGE": 25,
        "GENDER": "Female",
        "ANXIETY": "Yes",
        "DEPRESSION": "No",
        "SLEEP_ISSUES": "Sometimes",
        "SOCIAL_WITHDRAWAL": "No",
        "STRESS_LEVEL": "Medium",
        "WORK_STUDY_PRESSURE": "High",
        "FAMILY_HISTORY": "No",
        "PHYSICAL_ACTIVITY": "Regular",
        "SOCIAL_SUPPORT": "Medium"
    })
}
