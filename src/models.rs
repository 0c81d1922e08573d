use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Some(Role::Student),
            "teacher" => Some(Role::Teacher),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MistakeType {
    Tajweed,
    Word,
    Stuck,
}

impl MistakeType {
    pub const ALL: [MistakeType; 3] = [MistakeType::Tajweed, MistakeType::Word, MistakeType::Stuck];

    pub fn as_str(self) -> &'static str {
        match self {
            MistakeType::Tajweed => "tajweed",
            MistakeType::Word => "word",
            MistakeType::Stuck => "stuck",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tajweed" => Some(MistakeType::Tajweed),
            "word" => Some(MistakeType::Word),
            "stuck" => Some(MistakeType::Stuck),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LessonProgress {
    NotStarted,
    InProgress,
    Completed,
}

impl LessonProgress {
    pub fn as_str(self) -> &'static str {
        match self {
            LessonProgress::NotStarted => "NotStarted",
            LessonProgress::InProgress => "InProgress",
            LessonProgress::Completed => "Completed",
        }
    }

    /// Exact tag match; stored values are always one of the three tags.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "NotStarted" => Some(LessonProgress::NotStarted),
            "InProgress" => Some(LessonProgress::InProgress),
            "Completed" => Some(LessonProgress::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub role: Role,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub user_id: Option<i64>,
    pub name: String,
    pub grade: String,
    pub current_juz: u8,
    pub completed_juz: Vec<u8>,
    pub current_surah: Option<String>,
    pub current_ayah: Option<i64>,
    pub notes: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherStudent {
    pub teacher_id: i64,
    pub student_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: i64,
    pub date: String,
    pub student1_id: i64,
    pub student2_id: i64,
    pub surah_start: String,
    pub ayah_start: i64,
    pub surah_end: String,
    pub ayah_end: i64,
    pub completed: bool,
    pub created_at: String,
}

impl Session {
    pub fn involves(&self, student_id: i64) -> bool {
        self.student1_id == student_id || self.student2_id == student_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mistake {
    pub id: i64,
    pub session_id: i64,
    pub student_id: i64,
    #[serde(rename = "type")]
    pub mistake_type: MistakeType,
    pub surah: String,
    pub ayah: i64,
    pub description: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: i64,
    pub date: String,
    pub teacher_id: i64,
    pub student_id: i64,
    pub surah_start: String,
    pub ayah_start: i64,
    pub surah_end: String,
    pub ayah_end: i64,
    pub notes: String,
    pub progress: LessonProgress,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonMistake {
    pub id: i64,
    pub lesson_id: i64,
    pub student_id: i64,
    #[serde(rename = "type")]
    pub mistake_type: MistakeType,
    pub surah: String,
    pub ayah: i64,
    pub description: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentWithStats {
    #[serde(flatten)]
    pub student: Student,
    pub session_count: usize,
    pub average_mistakes: f64,
    pub most_common_mistake_type: Option<MistakeType>,
}
