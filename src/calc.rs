use crate::models::{
    Lesson, LessonMistake, LessonProgress, Mistake, MistakeType, Session, Student, StudentWithStats,
};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

pub const SMOOTHING_WINDOW: usize = 7;

const WEEKDAYS: [(Weekday, &str); 7] = [
    (Weekday::Sun, "Sun"),
    (Weekday::Mon, "Mon"),
    (Weekday::Tue, "Tue"),
    (Weekday::Wed, "Wed"),
    (Weekday::Thu, "Thu"),
    (Weekday::Fri, "Fri"),
    (Weekday::Sat, "Sat"),
];

/// Half-up rounding to one decimal: `floor(10*x + 0.5) / 10`.
pub fn round_off_1_decimal(x: f64) -> f64 {
    ((10.0 * x) + 0.5).floor() / 10.0
}

/// Calendar date of an RFC 3339 timestamp, compared as a plain ISO string.
pub fn date_part(timestamp: &str) -> &str {
    timestamp.get(..10).unwrap_or(timestamp)
}

/// Strict `YYYY-MM-DD`: four-digit unsigned year, so only 0001..=9999.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let b = raw.as_bytes();
    let shape_ok = b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && b
            .iter()
            .enumerate()
            .all(|(i, c)| i == 4 || i == 7 || c.is_ascii_digit());
    if !shape_ok {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .filter(|d| d.year() >= 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MistakeDistribution {
    pub tajweed: i64,
    pub word: i64,
    pub stuck: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekdayCount {
    pub day: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub date: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressPoint {
    pub date: String,
    pub count: f64,
    pub mistake_type: Option<MistakeType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonProgressPoint {
    pub date: String,
    pub lessons: usize,
    pub mistakes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherLessonStats {
    pub total_lessons: usize,
    pub completed_lessons: usize,
    pub unique_students: usize,
    pub average_mistakes_per_lesson: f64,
}

/// `mistakes / sessions`, zero when there are no sessions.
pub fn average_mistakes(mistakes: usize, sessions: usize) -> f64 {
    if sessions == 0 {
        0.0
    } else {
        mistakes as f64 / sessions as f64
    }
}

/// Highest-frequency type; equal counts resolve to the lexicographically
/// smallest type name.
pub fn most_common_mistake_type<I>(types: I) -> Option<MistakeType>
where
    I: IntoIterator<Item = MistakeType>,
{
    let mut counts: HashMap<MistakeType, usize> = HashMap::new();
    for t in types {
        *counts.entry(t).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|(a_type, a_count), (b_type, b_count)| {
            a_count
                .cmp(b_count)
                .then_with(|| b_type.as_str().cmp(a_type.as_str()))
        })
        .map(|(t, _)| t)
}

pub fn student_with_stats(
    student: Student,
    sessions: &[Session],
    mistakes: &[Mistake],
) -> StudentWithStats {
    let session_count = sessions.iter().filter(|s| s.involves(student.id)).count();
    let own: Vec<MistakeType> = mistakes
        .iter()
        .filter(|m| m.student_id == student.id)
        .map(|m| m.mistake_type)
        .collect();
    StudentWithStats {
        session_count,
        average_mistakes: average_mistakes(own.len(), session_count),
        most_common_mistake_type: most_common_mistake_type(own),
        student,
    }
}

/// Integer percentage per type, each rounded on its own. The three values
/// need not add up to exactly 100.
pub fn mistake_type_distribution<I>(types: I) -> MistakeDistribution
where
    I: IntoIterator<Item = MistakeType>,
{
    let (mut tajweed, mut word, mut stuck) = (0usize, 0usize, 0usize);
    for t in types {
        match t {
            MistakeType::Tajweed => tajweed += 1,
            MistakeType::Word => word += 1,
            MistakeType::Stuck => stuck += 1,
        }
    }
    let total = tajweed + word + stuck;
    let pct = |n: usize| -> i64 {
        if total == 0 {
            0
        } else {
            ((n as f64) * 100.0 / (total as f64)).round() as i64
        }
    };
    MistakeDistribution {
        tajweed: pct(tajweed),
        word: pct(word),
        stuck: pct(stuck),
    }
}

/// Sessions per weekday, Sun through Sat. Sessions with an unparseable date
/// are not counted.
pub fn sessions_by_weekday(sessions: &[Session]) -> Vec<WeekdayCount> {
    let mut out: Vec<WeekdayCount> = WEEKDAYS
        .iter()
        .map(|(_, label)| WeekdayCount {
            day: *label,
            count: 0,
        })
        .collect();
    for s in sessions {
        let Some(date) = parse_iso_date(&s.date) else {
            continue;
        };
        let weekday = date.weekday();
        if let Some(idx) = WEEKDAYS.iter().position(|(w, _)| *w == weekday) {
            out[idx].count += 1;
        }
    }
    out
}

/// The `days` calendar dates ending at `as_of`, ascending. Dates before the
/// start of chrono's range are left out.
pub fn day_scaffold(as_of: NaiveDate, days: usize) -> Vec<String> {
    (0..days)
        .rev()
        .filter_map(|back| as_of.checked_sub_days(Days::new(back as u64)))
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect()
}

fn scaffold_index(scaffold: &[String]) -> HashMap<&str, usize> {
    scaffold
        .iter()
        .enumerate()
        .map(|(i, d)| (d.as_str(), i))
        .collect()
}

pub fn mistake_trend<'a, I>(created_at: I, as_of: NaiveDate, days: usize) -> Vec<TrendPoint>
where
    I: IntoIterator<Item = &'a str>,
{
    let scaffold = day_scaffold(as_of, days);
    let mut counts = vec![0usize; scaffold.len()];
    {
        let index = scaffold_index(&scaffold);
        for ts in created_at {
            if let Some(i) = index.get(date_part(ts)) {
                counts[*i] += 1;
            }
        }
    }
    scaffold
        .into_iter()
        .zip(counts)
        .map(|(date, count)| TrendPoint { date, count })
        .collect()
}

/// Trailing simple moving average. The first `SMOOTHING_WINDOW - 1` points
/// pass through unchanged.
pub fn trailing_moving_average(raw: &[usize]) -> Vec<f64> {
    raw.iter()
        .enumerate()
        .map(|(i, v)| {
            if i + 1 < SMOOTHING_WINDOW {
                *v as f64
            } else {
                let window = &raw[i + 1 - SMOOTHING_WINDOW..=i];
                window.iter().sum::<usize>() as f64 / SMOOTHING_WINDOW as f64
            }
        })
        .collect()
}

/// Per-day mistake counts for one student with 7-day smoothing. Expects
/// `mistakes` in creation order; each day keeps the type of its last mistake.
pub fn student_progress(
    mistakes: &[Mistake],
    as_of: NaiveDate,
    days: usize,
) -> Vec<ProgressPoint> {
    let scaffold = day_scaffold(as_of, days);
    let mut raw = vec![0usize; scaffold.len()];
    let mut last_type: Vec<Option<MistakeType>> = vec![None; scaffold.len()];
    {
        let index = scaffold_index(&scaffold);
        for m in mistakes {
            if let Some(i) = index.get(date_part(&m.created_at)) {
                raw[*i] += 1;
                last_type[*i] = Some(m.mistake_type);
            }
        }
    }
    let smoothed = trailing_moving_average(&raw);
    scaffold
        .into_iter()
        .zip(smoothed)
        .zip(last_type)
        .map(|((date, count), mistake_type)| ProgressPoint {
            date,
            count,
            mistake_type,
        })
        .collect()
}

pub fn teacher_lesson_stats(
    lessons: &[Lesson],
    linked_student_ids: &[i64],
    lesson_mistake_count: usize,
) -> TeacherLessonStats {
    let total_lessons = lessons.len();
    let completed_lessons = lessons
        .iter()
        .filter(|l| l.progress == LessonProgress::Completed)
        .count();
    let students: HashSet<i64> = lessons
        .iter()
        .map(|l| l.student_id)
        .chain(linked_student_ids.iter().copied())
        .collect();
    TeacherLessonStats {
        total_lessons,
        completed_lessons,
        unique_students: students.len(),
        average_mistakes_per_lesson: round_off_1_decimal(average_mistakes(
            lesson_mistake_count,
            total_lessons,
        )),
    }
}

/// Per-day lesson and lesson-mistake counts for one student. Unsmoothed.
pub fn student_lesson_progress(
    lessons: &[Lesson],
    lesson_mistakes: &[LessonMistake],
    as_of: NaiveDate,
    days: usize,
) -> Vec<LessonProgressPoint> {
    let scaffold = day_scaffold(as_of, days);
    let mut lesson_counts = vec![0usize; scaffold.len()];
    let mut mistake_counts = vec![0usize; scaffold.len()];
    {
        let index = scaffold_index(&scaffold);
        let mut lesson_day: HashMap<i64, usize> = HashMap::new();
        for l in lessons {
            if let Some(i) = index.get(l.date.as_str()) {
                lesson_counts[*i] += 1;
                lesson_day.insert(l.id, *i);
            }
        }
        for m in lesson_mistakes {
            if let Some(i) = lesson_day.get(&m.lesson_id) {
                mistake_counts[*i] += 1;
            }
        }
    }
    scaffold
        .into_iter()
        .zip(lesson_counts.into_iter().zip(mistake_counts))
        .map(|(date, (lessons, mistakes))| LessonProgressPoint {
            date,
            lessons,
            mistakes,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_iso_date(s).expect("date")
    }

    fn mistake(id: i64, student_id: i64, t: MistakeType, created_at: &str) -> Mistake {
        Mistake {
            id,
            session_id: 1,
            student_id,
            mistake_type: t,
            surah: "Al-Fatihah".into(),
            ayah: 1,
            description: String::new(),
            created_at: created_at.into(),
        }
    }

    fn session(id: i64, a: i64, b: i64, d: &str) -> Session {
        Session {
            id,
            date: d.into(),
            student1_id: a,
            student2_id: b,
            surah_start: "Al-Fatihah".into(),
            ayah_start: 1,
            surah_end: "Al-Fatihah".into(),
            ayah_end: 7,
            completed: false,
            created_at: format!("{}T09:00:00Z", d),
        }
    }

    fn lesson(id: i64, student_id: i64, d: &str, progress: LessonProgress) -> Lesson {
        Lesson {
            id,
            date: d.into(),
            teacher_id: 1,
            student_id,
            surah_start: "An-Nas".into(),
            ayah_start: 1,
            surah_end: "An-Nas".into(),
            ayah_end: 6,
            notes: String::new(),
            progress,
            created_at: format!("{}T09:00:00Z", d),
        }
    }

    fn student(id: i64) -> Student {
        Student {
            id,
            user_id: None,
            name: "Test".into(),
            grade: String::new(),
            current_juz: 5,
            completed_juz: Vec::new(),
            current_surah: None,
            current_ayah: None,
            notes: String::new(),
            created_at: "2026-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn round_off_is_half_up() {
        assert_eq!(round_off_1_decimal(0.0), 0.0);
        assert_eq!(round_off_1_decimal(1.25), 1.3);
        assert_eq!(round_off_1_decimal(3.54), 3.5);
        assert_eq!(round_off_1_decimal(2.0 / 3.0), 0.7);
    }

    #[test]
    fn zero_sessions_average_is_zero() {
        assert_eq!(average_mistakes(0, 0), 0.0);
        assert_eq!(average_mistakes(4, 0), 0.0);
        let stats = student_with_stats(student(9), &[], &[]);
        assert_eq!(stats.session_count, 0);
        assert_eq!(stats.average_mistakes, 0.0);
        assert_eq!(stats.most_common_mistake_type, None);
    }

    #[test]
    fn student_stats_counts_both_session_sides() {
        let sessions = vec![
            session(1, 1, 2, "2026-10-01"),
            session(2, 3, 1, "2026-10-02"),
            session(3, 2, 3, "2026-10-03"),
        ];
        let mistakes = vec![
            mistake(1, 1, MistakeType::Tajweed, "2026-10-01T10:00:00Z"),
            mistake(2, 1, MistakeType::Tajweed, "2026-10-02T10:00:00Z"),
            mistake(3, 1, MistakeType::Word, "2026-10-02T10:05:00Z"),
            mistake(4, 2, MistakeType::Stuck, "2026-10-03T10:00:00Z"),
        ];
        let stats = student_with_stats(student(1), &sessions, &mistakes);
        assert_eq!(stats.session_count, 2);
        assert_eq!(stats.average_mistakes, 1.5);
        assert_eq!(stats.most_common_mistake_type, Some(MistakeType::Tajweed));
    }

    #[test]
    fn most_common_tie_breaks_on_type_name() {
        let tie = [MistakeType::Word, MistakeType::Tajweed];
        assert_eq!(most_common_mistake_type(tie), Some(MistakeType::Tajweed));
        let three_way = [MistakeType::Word, MistakeType::Tajweed, MistakeType::Stuck];
        assert_eq!(most_common_mistake_type(three_way), Some(MistakeType::Stuck));
        let clear = [MistakeType::Word, MistakeType::Word, MistakeType::Stuck];
        assert_eq!(most_common_mistake_type(clear), Some(MistakeType::Word));
    }

    #[test]
    fn distribution_rounds_each_type_independently() {
        let mut types = vec![MistakeType::Tajweed; 4];
        types.extend(vec![MistakeType::Word; 3]);
        types.extend(vec![MistakeType::Stuck; 3]);
        assert_eq!(
            mistake_type_distribution(types),
            MistakeDistribution {
                tajweed: 40,
                word: 30,
                stuck: 30
            }
        );

        // 1/3 each rounds down to 33 three times.
        let thirds = mistake_type_distribution(MistakeType::ALL);
        let sum = thirds.tajweed + thirds.word + thirds.stuck;
        assert_eq!(sum, 99);

        // 1/6, 1/6, 4/6 → 17 + 17 + 67 = 101.
        let mut skewed = vec![MistakeType::Tajweed, MistakeType::Word];
        skewed.extend(vec![MistakeType::Stuck; 4]);
        let d = mistake_type_distribution(skewed);
        assert_eq!((d.tajweed, d.word, d.stuck), (17, 17, 67));

        for d in [thirds, d] {
            for v in [d.tajweed, d.word, d.stuck] {
                assert!((0..=100).contains(&v));
            }
            assert!((d.tajweed + d.word + d.stuck - 100).abs() <= 2);
        }

        assert_eq!(
            mistake_type_distribution(Vec::new()),
            MistakeDistribution {
                tajweed: 0,
                word: 0,
                stuck: 0
            }
        );
    }

    #[test]
    fn weekday_buckets_are_zero_filled() {
        // 2026-10-17 is a Saturday, 2026-10-19 a Monday.
        let sessions = vec![
            session(1, 1, 2, "2026-10-17"),
            session(2, 1, 2, "2026-10-19"),
            session(3, 1, 2, "2026-10-24"),
            session(4, 1, 2, "garbage"),
        ];
        let buckets = sessions_by_weekday(&sessions);
        let labels: Vec<&str> = buckets.iter().map(|b| b.day).collect();
        assert_eq!(labels, vec!["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]);
        let get = |d: &str| buckets.iter().find(|b| b.day == d).map(|b| b.count);
        assert_eq!(get("Sat"), Some(2));
        assert_eq!(get("Mon"), Some(1));
        assert_eq!(get("Wed"), Some(0));
        assert_eq!(buckets.iter().map(|b| b.count).sum::<usize>(), 3);
    }

    #[test]
    fn trend_has_exactly_n_ascending_days() {
        let as_of = date("2026-03-01");
        let created = [
            "2026-02-28T23:59:00Z",
            "2026-03-01T08:00:00Z",
            "2026-03-01T09:00:00Z",
            "2026-01-01T09:00:00Z",
        ];
        let trend = mistake_trend(created.iter().copied(), as_of, 5);
        assert_eq!(trend.len(), 5);
        assert_eq!(trend[0].date, "2026-02-25");
        assert_eq!(trend[4].date, "2026-03-01");
        assert!(trend.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(trend[3].count, 1);
        assert_eq!(trend[4].count, 2);
        assert_eq!(trend.iter().map(|p| p.count).sum::<usize>(), 3);
    }

    #[test]
    fn iso_dates_must_have_four_digit_years() {
        assert_eq!(date("0001-01-01").year(), 1);
        assert_eq!(date("9999-12-31").year(), 9999);
        for raw in [
            "-262143-01-01",
            "+2026-01-01",
            "12026-01-01",
            "0000-01-01",
            "2026-1-01",
            "2026-02-30",
            "2026/02/01",
        ] {
            assert!(parse_iso_date(raw).is_none(), "{} should be rejected", raw);
        }
    }

    #[test]
    fn scaffold_stops_at_the_earliest_representable_day() {
        let scaffold = day_scaffold(NaiveDate::MIN, 3);
        assert_eq!(scaffold.len(), 1);
        let near_start = day_scaffold(date("0001-01-02"), 365);
        assert_eq!(near_start.len(), 365);
        assert_eq!(near_start[364], "0001-01-02");
    }

    #[test]
    fn moving_average_passes_through_short_prefix() {
        let flat = trailing_moving_average(&[3, 3, 3, 3, 3, 3, 3]);
        assert_eq!(flat[6], 3.0);

        let raw = [1, 0, 2, 0, 0, 0, 4, 7];
        let smoothed = trailing_moving_average(&raw);
        assert_eq!(&smoothed[..6], &[1.0, 0.0, 2.0, 0.0, 0.0, 0.0]);
        assert!((smoothed[6] - 1.0).abs() < 1e-9);
        assert!((smoothed[7] - 13.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn student_progress_keeps_last_type_unsmoothed() {
        let as_of = date("2026-05-10");
        let mistakes = vec![
            mistake(1, 1, MistakeType::Word, "2026-05-09T08:00:00Z"),
            mistake(2, 1, MistakeType::Tajweed, "2026-05-09T09:00:00Z"),
            mistake(3, 1, MistakeType::Stuck, "2026-05-10T09:00:00Z"),
        ];
        let points = student_progress(&mistakes, as_of, 3);
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].count, 0.0);
        assert_eq!(points[0].mistake_type, None);
        assert_eq!(points[1].count, 2.0);
        assert_eq!(points[1].mistake_type, Some(MistakeType::Tajweed));
        assert_eq!(points[2].mistake_type, Some(MistakeType::Stuck));

        let long = student_progress(&mistakes, as_of, 10);
        // index 8 averages raw counts [0,0,0,0,0,0,2] over 7 days.
        assert!((long[8].count - 2.0 / 7.0).abs() < 1e-9);
        assert_eq!(long[8].mistake_type, Some(MistakeType::Tajweed));
    }

    #[test]
    fn teacher_stats_unions_lesson_and_linked_students() {
        let lessons = vec![
            lesson(1, 10, "2026-10-01", LessonProgress::Completed),
            lesson(2, 10, "2026-10-02", LessonProgress::InProgress),
            lesson(3, 11, "2026-10-03", LessonProgress::Completed),
        ];
        let stats = teacher_lesson_stats(&lessons, &[11, 12], 4);
        assert_eq!(stats.total_lessons, 3);
        assert_eq!(stats.completed_lessons, 2);
        assert_eq!(stats.unique_students, 3);
        assert_eq!(stats.average_mistakes_per_lesson, 1.3);

        let empty = teacher_lesson_stats(&[], &[], 0);
        assert_eq!(empty.average_mistakes_per_lesson, 0.0);
        assert_eq!(empty.unique_students, 0);
    }

    #[test]
    fn lesson_progress_counts_lessons_and_their_mistakes() {
        let lessons = vec![
            lesson(1, 10, "2026-10-15", LessonProgress::Completed),
            lesson(2, 10, "2026-10-17", LessonProgress::NotStarted),
            lesson(3, 10, "2026-09-01", LessonProgress::Completed),
        ];
        let lm = |id: i64, lesson_id: i64| LessonMistake {
            id,
            lesson_id,
            student_id: 10,
            mistake_type: MistakeType::Word,
            surah: "An-Nas".into(),
            ayah: 2,
            description: String::new(),
            created_at: "2026-10-17T10:00:00Z".into(),
        };
        let mistakes = vec![lm(1, 1), lm(2, 1), lm(3, 2), lm(4, 3)];
        let points = student_lesson_progress(&lessons, &mistakes, date("2026-10-17"), 3);
        assert_eq!(
            points,
            vec![
                LessonProgressPoint {
                    date: "2026-10-15".into(),
                    lessons: 1,
                    mistakes: 2
                },
                LessonProgressPoint {
                    date: "2026-10-16".into(),
                    lessons: 0,
                    mistakes: 0
                },
                LessonProgressPoint {
                    date: "2026-10-17".into(),
                    lessons: 1,
                    mistakes: 1
                },
            ]
        );
    }
}
