//! Activity catalog.
//!
//! External providers report activities as numeric exercise-type codes. The
//! catalog maps those codes to the display labels used as
//! [`ExerciseRecord::activity_type`](crate::ExerciseRecord), and lists the
//! labels a user may pick when authoring a local record.

/// Label used for codes the catalog does not know.
pub const UNKNOWN_ACTIVITY: &str = "Unknown Exercise";

const CATALOG: &[(u16, &str)] = &[
    (2, "Badminton"),
    (4, "Baseball"),
    (5, "Basketball"),
    (8, "Biking"),
    (9, "Stationary Biking"),
    (10, "Boot Camp"),
    (11, "Boxing"),
    (13, "Calisthenics"),
    (14, "Cricket"),
    (16, "Dancing"),
    (25, "Elliptical"),
    (27, "Fencing"),
    (28, "Football (American)"),
    (29, "Football (Australian)"),
    (31, "Frisbee"),
    (32, "Golf"),
    (33, "Guided Breathing"),
    (34, "Gymnastics"),
    (35, "Handball"),
    (36, "HIIT"),
    (37, "Hiking"),
    (38, "Ice Hockey"),
    (39, "Ice Skating"),
    (44, "Martial Arts"),
    (46, "Paddling"),
    (47, "Paragliding"),
    (48, "Pilates"),
    (50, "Racquetball"),
    (51, "Rock Climbing"),
    (53, "Rowing"),
    (54, "Rowing Machine"),
    (55, "Rugby"),
    (56, "Running"),
    (57, "Treadmill Running"),
    (58, "Sailing"),
    (59, "Scuba Diving"),
    (60, "Skating"),
    (61, "Skiing"),
    (62, "Snowboarding"),
    (63, "Snowshoeing"),
    (64, "Soccer"),
    (65, "Softball"),
    (66, "Squash"),
    (68, "Stair Climbing"),
    (69, "Stair Climbing Machine"),
    (70, "Strength Training"),
    (71, "Stretching"),
    (72, "Surfing"),
    (73, "Swimming (Open Water)"),
    (74, "Swimming (Pool)"),
    (75, "Table Tennis"),
    (76, "Tennis"),
    (78, "Volleyball"),
    (79, "Walking"),
    (80, "Water Polo"),
    (81, "Weightlifting"),
    (82, "Wheelchair"),
    (83, "Yoga"),
];

/// Display label for a provider exercise-type code.
pub fn activity_name(code: u16) -> &'static str {
    CATALOG
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
        .unwrap_or(UNKNOWN_ACTIVITY)
}

/// Reverse lookup. Exact, case-sensitive match on the display label.
pub fn activity_code(name: &str) -> Option<u16> {
    CATALOG
        .iter()
        .find(|(_, n)| *n == name)
        .map(|(code, _)| *code)
}

/// All known labels, sorted.
pub fn supported_activities() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = CATALOG.iter().map(|(_, name)| *name).collect();
    names.sort_unstable();
    names
}
