use crate::calc::{
    self, LessonProgressPoint, MistakeDistribution, ProgressPoint, TeacherLessonStats, TrendPoint,
    WeekdayCount,
};
use crate::db;
use crate::error::{StoreError, StoreResult};
use crate::models::{
    Lesson, LessonMistake, LessonProgress, Mistake, MistakeType, Role, Session, Student,
    StudentWithStats, TeacherStudent, User,
};
use crate::quran;
use chrono::{NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Default)]
pub struct NewStudent {
    pub user_id: Option<i64>,
    pub name: String,
    pub grade: String,
    pub current_juz: Option<u8>,
    pub completed_juz: Vec<u8>,
    pub current_surah: Option<String>,
    pub current_ayah: Option<i64>,
    pub notes: String,
}

#[derive(Debug, Clone, Default)]
pub struct StudentPatch {
    pub user_id: Option<Option<i64>>,
    pub name: Option<String>,
    pub grade: Option<String>,
    pub current_juz: Option<u8>,
    pub completed_juz: Option<Vec<u8>>,
    pub current_surah: Option<Option<String>>,
    pub current_ayah: Option<Option<i64>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewSession {
    pub date: String,
    pub student1_id: i64,
    pub student2_id: i64,
    pub surah_start: String,
    pub ayah_start: i64,
    pub surah_end: String,
    pub ayah_end: i64,
    pub completed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SessionPatch {
    pub date: Option<String>,
    pub student1_id: Option<i64>,
    pub student2_id: Option<i64>,
    pub surah_start: Option<String>,
    pub ayah_start: Option<i64>,
    pub surah_end: Option<String>,
    pub ayah_end: Option<i64>,
    pub completed: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct NewMistake {
    pub session_id: i64,
    pub student_id: i64,
    pub mistake_type: MistakeType,
    pub surah: String,
    pub ayah: i64,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct MistakePatch {
    pub mistake_type: Option<MistakeType>,
    pub surah: Option<String>,
    pub ayah: Option<i64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewLesson {
    pub date: String,
    pub teacher_id: i64,
    pub student_id: i64,
    pub surah_start: String,
    pub ayah_start: i64,
    pub surah_end: String,
    pub ayah_end: i64,
    pub notes: String,
    pub progress: LessonProgress,
}

#[derive(Debug, Clone, Default)]
pub struct LessonPatch {
    pub date: Option<String>,
    pub surah_start: Option<String>,
    pub ayah_start: Option<i64>,
    pub surah_end: Option<String>,
    pub ayah_end: Option<i64>,
    pub notes: Option<String>,
    pub progress: Option<LessonProgress>,
}

#[derive(Debug, Clone)]
pub struct NewLessonMistake {
    pub lesson_id: i64,
    pub mistake_type: MistakeType,
    pub surah: String,
    pub ayah: i64,
    pub description: String,
}

/// Full dump of every collection, used by backup bundles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub users: Vec<User>,
    pub students: Vec<Student>,
    pub teacher_students: Vec<TeacherStudent>,
    pub sessions: Vec<Session>,
    pub mistakes: Vec<Mistake>,
    pub lessons: Vec<Lesson>,
    pub lesson_mistakes: Vec<LessonMistake>,
    #[serde(default)]
    pub settings: BTreeMap<String, serde_json::Value>,
}

const USER_COLS: &str = "id, username, name, role, created_at";
const STUDENT_COLS: &str = "id, user_id, name, grade, current_juz, completed_juz, \
    current_surah, current_ayah, notes, created_at";
const SESSION_COLS: &str = "id, date, student1_id, student2_id, surah_start, ayah_start, \
    surah_end, ayah_end, completed, created_at";
const MISTAKE_COLS: &str = "id, session_id, student_id, type, surah, ayah, description, created_at";
const LESSON_COLS: &str = "id, date, teacher_id, student_id, surah_start, ayah_start, \
    surah_end, ayah_end, notes, progress, created_at";

fn now_ts() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn text_enum<T>(idx: usize, raw: String, parse: fn(&str) -> Option<T>) -> rusqlite::Result<T> {
    parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unexpected value {:?}", raw).into(),
        )
    })
}

fn user_from_row(r: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: r.get(0)?,
        username: r.get(1)?,
        name: r.get(2)?,
        role: text_enum(3, r.get(3)?, Role::parse)?,
        created_at: r.get(4)?,
    })
}

fn student_from_row(r: &Row<'_>) -> rusqlite::Result<Student> {
    let completed_raw: String = r.get(5)?;
    Ok(Student {
        id: r.get(0)?,
        user_id: r.get(1)?,
        name: r.get(2)?,
        grade: r.get(3)?,
        current_juz: r.get(4)?,
        completed_juz: serde_json::from_str(&completed_raw)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?,
        current_surah: r.get(6)?,
        current_ayah: r.get(7)?,
        notes: r.get(8)?,
        created_at: r.get(9)?,
    })
}

fn session_from_row(r: &Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        id: r.get(0)?,
        date: r.get(1)?,
        student1_id: r.get(2)?,
        student2_id: r.get(3)?,
        surah_start: r.get(4)?,
        ayah_start: r.get(5)?,
        surah_end: r.get(6)?,
        ayah_end: r.get(7)?,
        completed: r.get::<_, i64>(8)? != 0,
        created_at: r.get(9)?,
    })
}

fn mistake_from_row(r: &Row<'_>) -> rusqlite::Result<Mistake> {
    Ok(Mistake {
        id: r.get(0)?,
        session_id: r.get(1)?,
        student_id: r.get(2)?,
        mistake_type: text_enum(3, r.get(3)?, MistakeType::parse)?,
        surah: r.get(4)?,
        ayah: r.get(5)?,
        description: r.get(6)?,
        created_at: r.get(7)?,
    })
}

fn lesson_from_row(r: &Row<'_>) -> rusqlite::Result<Lesson> {
    Ok(Lesson {
        id: r.get(0)?,
        date: r.get(1)?,
        teacher_id: r.get(2)?,
        student_id: r.get(3)?,
        surah_start: r.get(4)?,
        ayah_start: r.get(5)?,
        surah_end: r.get(6)?,
        ayah_end: r.get(7)?,
        notes: r.get(8)?,
        progress: text_enum(9, r.get(9)?, LessonProgress::parse)?,
        created_at: r.get(10)?,
    })
}

fn lesson_mistake_from_row(r: &Row<'_>) -> rusqlite::Result<LessonMistake> {
    Ok(LessonMistake {
        id: r.get(0)?,
        lesson_id: r.get(1)?,
        student_id: r.get(2)?,
        mistake_type: text_enum(3, r.get(3)?, MistakeType::parse)?,
        surah: r.get(4)?,
        ayah: r.get(5)?,
        description: r.get(6)?,
        created_at: r.get(7)?,
    })
}

fn canonical_surah(raw: &str, field: &str) -> StoreResult<&'static quran::SurahDef> {
    quran::find_surah(raw)
        .ok_or_else(|| StoreError::bad_params(format!("{} is not a known surah: {}", field, raw)))
}

fn check_ayah(def: &quran::SurahDef, ayah: i64, field: &str) -> StoreResult<()> {
    if ayah < 1 || ayah > i64::from(def.ayah_count) {
        return Err(StoreError::bad_params(format!(
            "{} must be in 1..={} for {}",
            field, def.ayah_count, def.name
        )));
    }
    Ok(())
}

fn check_date(raw: &str, field: &str) -> StoreResult<String> {
    calc::parse_iso_date(raw)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .ok_or_else(|| {
            StoreError::bad_params(format!("{} must be an ISO date (YYYY-MM-DD)", field))
        })
}

fn check_juz(juz: u8, field: &str) -> StoreResult<()> {
    if !(1..=quran::JUZ_COUNT).contains(&juz) {
        return Err(StoreError::bad_params(format!("{} must be in 1..=30", field)));
    }
    Ok(())
}

fn non_empty(raw: &str, field: &str) -> StoreResult<String> {
    let v = raw.trim();
    if v.is_empty() {
        return Err(StoreError::bad_params(format!("{} must not be empty", field)));
    }
    Ok(v.to_string())
}

/// Canonicalizes a recitation range in place.
fn check_range(
    surah_start: &mut String,
    ayah_start: i64,
    surah_end: &mut String,
    ayah_end: i64,
) -> StoreResult<()> {
    let start = canonical_surah(surah_start, "surahStart")?;
    check_ayah(start, ayah_start, "ayahStart")?;
    let end = canonical_surah(surah_end, "surahEnd")?;
    check_ayah(end, ayah_end, "ayahEnd")?;
    *surah_start = start.name.to_string();
    *surah_end = end.name.to_string();
    Ok(())
}

fn check_recited(surah: &str, ayah: i64, field: &str) -> StoreResult<()> {
    check_ayah(canonical_surah(surah, field)?, ayah, field)
}

fn in_row(kind: &'static str, id: i64) -> impl Fn(StoreError) -> StoreError {
    move |e| StoreError::bad_params(format!("{} {}: {}", kind, id, e))
}

/// Applies the create-time rules to every row of an imported snapshot.
/// Referential links are left to the foreign keys.
fn check_snapshot(snapshot: &Snapshot) -> StoreResult<()> {
    let roles: HashMap<i64, Role> = snapshot.users.iter().map(|u| (u.id, u.role)).collect();
    for s in &snapshot.students {
        let at = in_row("student", s.id);
        non_empty(&s.name, "name").map_err(&at)?;
        check_juz(s.current_juz, "currentJuz").map_err(&at)?;
        for juz in &s.completed_juz {
            check_juz(*juz, "completedJuz").map_err(&at)?;
        }
        match (s.current_surah.as_deref(), s.current_ayah) {
            (Some(surah), Some(ayah)) => check_recited(surah, ayah, "currentSurah").map_err(&at)?,
            (Some(surah), None) => {
                canonical_surah(surah, "currentSurah").map_err(&at)?;
            }
            (None, Some(_)) => {
                return Err(at(StoreError::bad_params("currentAyah requires currentSurah")))
            }
            (None, None) => {}
        }
        if let Some(uid) = s.user_id {
            if roles.get(&uid) != Some(&Role::Student) {
                return Err(at(StoreError::bad_params(format!(
                    "user {} is not a student account",
                    uid
                ))));
            }
        }
    }
    for l in &snapshot.teacher_students {
        if roles.get(&l.teacher_id) != Some(&Role::Teacher) {
            return Err(StoreError::bad_params(format!(
                "link to student {}: user {} is not a teacher",
                l.student_id, l.teacher_id
            )));
        }
    }

    let mut sessions: HashMap<i64, &Session> = HashMap::new();
    for s in &snapshot.sessions {
        let at = in_row("session", s.id);
        check_date(&s.date, "date").map_err(&at)?;
        if s.student1_id == s.student2_id {
            return Err(at(StoreError::bad_params(
                "student1Id and student2Id must differ",
            )));
        }
        check_recited(&s.surah_start, s.ayah_start, "surahStart").map_err(&at)?;
        check_recited(&s.surah_end, s.ayah_end, "surahEnd").map_err(&at)?;
        sessions.insert(s.id, s);
    }
    for m in &snapshot.mistakes {
        let at = in_row("mistake", m.id);
        check_recited(&m.surah, m.ayah, "surah").map_err(&at)?;
        let Some(session) = sessions.get(&m.session_id) else {
            return Err(at(StoreError::bad_params(format!(
                "session {} is not in the snapshot",
                m.session_id
            ))));
        };
        if !session.involves(m.student_id) {
            return Err(at(StoreError::bad_params(format!(
                "student {} did not take part in session {}",
                m.student_id, m.session_id
            ))));
        }
    }

    let mut lesson_students: HashMap<i64, i64> = HashMap::new();
    for l in &snapshot.lessons {
        let at = in_row("lesson", l.id);
        check_date(&l.date, "date").map_err(&at)?;
        if roles.get(&l.teacher_id) != Some(&Role::Teacher) {
            return Err(at(StoreError::bad_params(format!(
                "user {} is not a teacher",
                l.teacher_id
            ))));
        }
        check_recited(&l.surah_start, l.ayah_start, "surahStart").map_err(&at)?;
        check_recited(&l.surah_end, l.ayah_end, "surahEnd").map_err(&at)?;
        lesson_students.insert(l.id, l.student_id);
    }
    for m in &snapshot.lesson_mistakes {
        let at = in_row("lesson mistake", m.id);
        check_recited(&m.surah, m.ayah, "surah").map_err(&at)?;
        if lesson_students.get(&m.lesson_id) != Some(&m.student_id) {
            return Err(at(StoreError::bad_params(format!(
                "student {} does not match lesson {}",
                m.student_id, m.lesson_id
            ))));
        }
    }
    Ok(())
}

/// In-memory (or workspace-backed) collection store for the daemon.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open_in_memory() -> anyhow::Result<Self> {
        Ok(Self {
            conn: db::open_in_memory()?,
        })
    }

    pub fn open_workspace(path: &Path) -> anyhow::Result<Self> {
        Ok(Self {
            conn: db::open_db(path)?,
        })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    fn query_list<T, P>(
        &self,
        sql: &str,
        params: P,
        map: fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> StoreResult<Vec<T>>
    where
        P: rusqlite::Params,
    {
        let mut stmt = self.conn.prepare(sql).map_err(StoreError::query)?;
        stmt.query_map(params, map)
            .and_then(|it| it.collect::<Result<Vec<_>, _>>())
            .map_err(StoreError::query)
    }

    fn query_one<T, P>(
        &self,
        sql: &str,
        params: P,
        map: fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> StoreResult<Option<T>>
    where
        P: rusqlite::Params,
    {
        self.conn
            .query_row(sql, params, map)
            .optional()
            .map_err(StoreError::query)
    }

    fn delete_by_id(&self, table: &str, id: i64) -> StoreResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?", table);
        self.conn
            .execute(&sql, [id])
            .map(|n| n > 0)
            .map_err(StoreError::delete)
    }

    // ---- users ----

    pub fn create_user(&self, input: NewUser) -> StoreResult<User> {
        let username = non_empty(&input.username, "username")?;
        let name = non_empty(&input.name, "name")?;
        if self.get_user_by_username(&username)?.is_some() {
            return Err(StoreError::Conflict(format!(
                "username already taken: {}",
                username
            )));
        }
        let created_at = now_ts();
        self.conn
            .execute(
                "INSERT INTO users(username, name, role, created_at) VALUES(?, ?, ?, ?)",
                params![username, name, input.role.as_str(), created_at],
            )
            .map_err(StoreError::insert)?;
        Ok(User {
            id: self.conn.last_insert_rowid(),
            username,
            name,
            role: input.role,
            created_at,
        })
    }

    pub fn get_user(&self, id: i64) -> StoreResult<Option<User>> {
        self.query_one(
            &format!("SELECT {} FROM users WHERE id = ?", USER_COLS),
            [id],
            user_from_row,
        )
    }

    pub fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        self.query_one(
            &format!("SELECT {} FROM users WHERE username = ?", USER_COLS),
            [username.trim()],
            user_from_row,
        )
    }

    pub fn list_users(&self, role: Option<Role>) -> StoreResult<Vec<User>> {
        match role {
            Some(role) => self.query_list(
                &format!("SELECT {} FROM users WHERE role = ? ORDER BY id", USER_COLS),
                [role.as_str()],
                user_from_row,
            ),
            None => self.query_list(
                &format!("SELECT {} FROM users ORDER BY id", USER_COLS),
                [],
                user_from_row,
            ),
        }
    }

    pub fn update_user(&self, id: i64, patch: UserPatch) -> StoreResult<Option<User>> {
        let Some(mut user) = self.get_user(id)? else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            user.name = non_empty(&name, "name")?;
        }
        if let Some(role) = patch.role {
            user.role = role;
        }
        self.conn
            .execute(
                "UPDATE users SET name = ?, role = ? WHERE id = ?",
                params![user.name, user.role.as_str(), id],
            )
            .map_err(StoreError::update)?;
        Ok(Some(user))
    }

    /// Removes the user with its teacher links and taught lessons; linked
    /// students keep their record with `userId` cleared.
    pub fn delete_user(&self, id: i64) -> StoreResult<bool> {
        self.delete_by_id("users", id)
    }

    fn require_teacher(&self, teacher_id: i64) -> StoreResult<User> {
        match self.get_user(teacher_id)? {
            Some(u) if u.role == Role::Teacher => Ok(u),
            Some(_) => Err(StoreError::bad_params(format!(
                "user {} is not a teacher",
                teacher_id
            ))),
            None => Err(StoreError::NotFound("teacher")),
        }
    }

    // ---- students ----

    fn finalize_student(&self, s: &mut Student, derive_juz: bool) -> StoreResult<()> {
        s.name = non_empty(&s.name, "name")?;
        s.grade = s.grade.trim().to_string();
        if let Some(uid) = s.user_id {
            match self.get_user(uid)? {
                Some(u) if u.role == Role::Student => {}
                Some(_) => {
                    return Err(StoreError::bad_params(format!(
                        "user {} is not a student account",
                        uid
                    )))
                }
                None => return Err(StoreError::NotFound("user")),
            }
        }

        let surah = match s.current_surah.as_deref() {
            Some(raw) => Some(canonical_surah(raw, "currentSurah")?),
            None => None,
        };
        match (surah, s.current_ayah) {
            (Some(def), Some(ayah)) => check_ayah(def, ayah, "currentAyah")?,
            (None, Some(_)) => {
                return Err(StoreError::bad_params(
                    "currentAyah requires currentSurah",
                ))
            }
            _ => {}
        }
        s.current_surah = surah.map(|d| d.name.to_string());

        if derive_juz {
            if let Some(name) = s.current_surah.as_deref() {
                if let Some(juz) = quran::get_surah_juz(name, s.current_ayah) {
                    s.current_juz = juz;
                }
            }
        }
        check_juz(s.current_juz, "currentJuz")?;
        for juz in &s.completed_juz {
            check_juz(*juz, "completedJuz")?;
        }
        s.completed_juz = match s.current_surah.as_deref() {
            Some(name) => quran::update_completed_juz(&s.completed_juz, name, s.current_ayah),
            None => s
                .completed_juz
                .iter()
                .copied()
                .collect::<BTreeSet<u8>>()
                .into_iter()
                .collect(),
        };
        Ok(())
    }

    pub fn create_student(&self, input: NewStudent) -> StoreResult<Student> {
        let derive_juz = input.current_juz.is_none();
        let mut student = Student {
            id: 0,
            user_id: input.user_id,
            name: input.name,
            grade: input.grade,
            current_juz: input.current_juz.unwrap_or(1),
            completed_juz: input.completed_juz,
            current_surah: input.current_surah,
            current_ayah: input.current_ayah,
            notes: input.notes,
            created_at: now_ts(),
        };
        self.finalize_student(&mut student, derive_juz)?;
        let completed_json =
            serde_json::to_string(&student.completed_juz).unwrap_or_else(|_| "[]".to_string());
        self.conn
            .execute(
                "INSERT INTO students(user_id, name, grade, current_juz, completed_juz,
                 current_surah, current_ayah, notes, created_at)
                 VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    student.user_id,
                    student.name,
                    student.grade,
                    student.current_juz,
                    completed_json,
                    student.current_surah,
                    student.current_ayah,
                    student.notes,
                    student.created_at
                ],
            )
            .map_err(StoreError::insert)?;
        student.id = self.conn.last_insert_rowid();
        Ok(student)
    }

    pub fn get_student(&self, id: i64) -> StoreResult<Option<Student>> {
        self.query_one(
            &format!("SELECT {} FROM students WHERE id = ?", STUDENT_COLS),
            [id],
            student_from_row,
        )
    }

    pub fn require_student(&self, id: i64) -> StoreResult<Student> {
        self.get_student(id)?.ok_or(StoreError::NotFound("student"))
    }

    pub fn list_students(&self) -> StoreResult<Vec<Student>> {
        self.query_list(
            &format!("SELECT {} FROM students ORDER BY id", STUDENT_COLS),
            [],
            student_from_row,
        )
    }

    pub fn student_for_user(&self, user_id: i64) -> StoreResult<Option<Student>> {
        self.query_one(
            &format!(
                "SELECT {} FROM students WHERE user_id = ? ORDER BY id LIMIT 1",
                STUDENT_COLS
            ),
            [user_id],
            student_from_row,
        )
    }

    /// Applies a partial update. `completedJuz` values are merged into the
    /// stored set, which never shrinks.
    pub fn update_student(&self, id: i64, patch: StudentPatch) -> StoreResult<Option<Student>> {
        let Some(mut student) = self.get_student(id)? else {
            return Ok(None);
        };
        let derive_juz = patch.current_surah.is_some() && patch.current_juz.is_none();
        if let Some(v) = patch.user_id {
            student.user_id = v;
        }
        if let Some(v) = patch.name {
            student.name = v;
        }
        if let Some(v) = patch.grade {
            student.grade = v;
        }
        if let Some(v) = patch.current_juz {
            student.current_juz = v;
        }
        if let Some(extra) = patch.completed_juz {
            student.completed_juz.extend(extra);
        }
        if let Some(v) = patch.current_surah {
            student.current_surah = v;
        }
        if let Some(v) = patch.current_ayah {
            student.current_ayah = v;
        }
        if let Some(v) = patch.notes {
            student.notes = v;
        }
        self.finalize_student(&mut student, derive_juz)?;
        let completed_json =
            serde_json::to_string(&student.completed_juz).unwrap_or_else(|_| "[]".to_string());
        self.conn
            .execute(
                "UPDATE students
                 SET user_id = ?, name = ?, grade = ?, current_juz = ?, completed_juz = ?,
                     current_surah = ?, current_ayah = ?, notes = ?
                 WHERE id = ?",
                params![
                    student.user_id,
                    student.name,
                    student.grade,
                    student.current_juz,
                    completed_json,
                    student.current_surah,
                    student.current_ayah,
                    student.notes,
                    id
                ],
            )
            .map_err(StoreError::update)?;
        Ok(Some(student))
    }

    /// Cascades to the student's sessions, mistakes, lessons, lesson-mistakes
    /// and teacher links.
    pub fn delete_student(&self, id: i64) -> StoreResult<bool> {
        self.delete_by_id("students", id)
    }

    // ---- teacher/student links ----

    pub fn link_teacher_student(
        &self,
        teacher_id: i64,
        student_id: i64,
    ) -> StoreResult<TeacherStudent> {
        self.require_teacher(teacher_id)?;
        self.require_student(student_id)?;
        let inserted = self
            .conn
            .execute(
                "INSERT OR IGNORE INTO teacher_students(teacher_id, student_id) VALUES(?, ?)",
                params![teacher_id, student_id],
            )
            .map_err(StoreError::insert)?;
        if inserted == 0 {
            return Err(StoreError::Conflict(format!(
                "student {} is already linked to teacher {}",
                student_id, teacher_id
            )));
        }
        Ok(TeacherStudent {
            teacher_id,
            student_id,
        })
    }

    pub fn unlink_teacher_student(&self, teacher_id: i64, student_id: i64) -> StoreResult<bool> {
        self.conn
            .execute(
                "DELETE FROM teacher_students WHERE teacher_id = ? AND student_id = ?",
                params![teacher_id, student_id],
            )
            .map(|n| n > 0)
            .map_err(StoreError::delete)
    }

    pub fn linked_student_ids(&self, teacher_id: i64) -> StoreResult<Vec<i64>> {
        self.query_list(
            "SELECT student_id FROM teacher_students WHERE teacher_id = ? ORDER BY student_id",
            [teacher_id],
            |r| r.get(0),
        )
    }

    pub fn students_for_teacher(&self, teacher_id: i64) -> StoreResult<Vec<Student>> {
        self.query_list(
            &format!(
                "SELECT {} FROM students
                 WHERE id IN (SELECT student_id FROM teacher_students WHERE teacher_id = ?)
                 ORDER BY id",
                STUDENT_COLS
            ),
            [teacher_id],
            student_from_row,
        )
    }

    pub fn teachers_for_student(&self, student_id: i64) -> StoreResult<Vec<User>> {
        self.query_list(
            &format!(
                "SELECT {} FROM users
                 WHERE id IN (SELECT teacher_id FROM teacher_students WHERE student_id = ?)
                 ORDER BY id",
                USER_COLS
            ),
            [student_id],
            user_from_row,
        )
    }

    // ---- sessions ----

    fn finalize_session(&self, s: &mut Session) -> StoreResult<()> {
        s.date = check_date(&s.date, "date")?;
        if s.student1_id == s.student2_id {
            return Err(StoreError::bad_params(
                "student1Id and student2Id must differ",
            ));
        }
        self.require_student(s.student1_id)?;
        self.require_student(s.student2_id)?;
        check_range(&mut s.surah_start, s.ayah_start, &mut s.surah_end, s.ayah_end)
    }

    pub fn create_session(&self, input: NewSession) -> StoreResult<Session> {
        let mut session = Session {
            id: 0,
            date: input.date,
            student1_id: input.student1_id,
            student2_id: input.student2_id,
            surah_start: input.surah_start,
            ayah_start: input.ayah_start,
            surah_end: input.surah_end,
            ayah_end: input.ayah_end,
            completed: input.completed,
            created_at: now_ts(),
        };
        self.finalize_session(&mut session)?;
        self.conn
            .execute(
                "INSERT INTO sessions(date, student1_id, student2_id, surah_start, ayah_start,
                 surah_end, ayah_end, completed, created_at)
                 VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    session.date,
                    session.student1_id,
                    session.student2_id,
                    session.surah_start,
                    session.ayah_start,
                    session.surah_end,
                    session.ayah_end,
                    session.completed,
                    session.created_at
                ],
            )
            .map_err(StoreError::insert)?;
        session.id = self.conn.last_insert_rowid();
        Ok(session)
    }

    pub fn get_session(&self, id: i64) -> StoreResult<Option<Session>> {
        self.query_one(
            &format!("SELECT {} FROM sessions WHERE id = ?", SESSION_COLS),
            [id],
            session_from_row,
        )
    }

    pub fn list_sessions(&self) -> StoreResult<Vec<Session>> {
        self.query_list(
            &format!("SELECT {} FROM sessions ORDER BY id", SESSION_COLS),
            [],
            session_from_row,
        )
    }

    /// Newest first by session date, then by id.
    pub fn recent_sessions(&self, limit: usize) -> StoreResult<Vec<Session>> {
        self.query_list(
            &format!(
                "SELECT {} FROM sessions ORDER BY date DESC, id DESC LIMIT ?",
                SESSION_COLS
            ),
            [limit as i64],
            session_from_row,
        )
    }

    pub fn sessions_for_student(&self, student_id: i64) -> StoreResult<Vec<Session>> {
        self.query_list(
            &format!(
                "SELECT {} FROM sessions WHERE student1_id = ?1 OR student2_id = ?1 ORDER BY id",
                SESSION_COLS
            ),
            [student_id],
            session_from_row,
        )
    }

    pub fn recent_sessions_for_student(
        &self,
        student_id: i64,
        limit: usize,
    ) -> StoreResult<Vec<Session>> {
        self.query_list(
            &format!(
                "SELECT {} FROM sessions WHERE student1_id = ?1 OR student2_id = ?1
                 ORDER BY date DESC, id DESC LIMIT ?2",
                SESSION_COLS
            ),
            params![student_id, limit as i64],
            session_from_row,
        )
    }

    pub fn update_session(&self, id: i64, patch: SessionPatch) -> StoreResult<Option<Session>> {
        let Some(mut session) = self.get_session(id)? else {
            return Ok(None);
        };
        if let Some(v) = patch.date {
            session.date = v;
        }
        if let Some(v) = patch.student1_id {
            session.student1_id = v;
        }
        if let Some(v) = patch.student2_id {
            session.student2_id = v;
        }
        if let Some(v) = patch.surah_start {
            session.surah_start = v;
        }
        if let Some(v) = patch.ayah_start {
            session.ayah_start = v;
        }
        if let Some(v) = patch.surah_end {
            session.surah_end = v;
        }
        if let Some(v) = patch.ayah_end {
            session.ayah_end = v;
        }
        if let Some(v) = patch.completed {
            session.completed = v;
        }
        self.finalize_session(&mut session)?;
        if let Some(m) = self
            .mistakes_for_session(id)?
            .into_iter()
            .find(|m| !session.involves(m.student_id))
        {
            return Err(StoreError::bad_params(format!(
                "student {} has mistakes recorded in session {} and must stay a participant",
                m.student_id, id
            )));
        }
        self.conn
            .execute(
                "UPDATE sessions
                 SET date = ?, student1_id = ?, student2_id = ?, surah_start = ?, ayah_start = ?,
                     surah_end = ?, ayah_end = ?, completed = ?
                 WHERE id = ?",
                params![
                    session.date,
                    session.student1_id,
                    session.student2_id,
                    session.surah_start,
                    session.ayah_start,
                    session.surah_end,
                    session.ayah_end,
                    session.completed,
                    id
                ],
            )
            .map_err(StoreError::update)?;
        Ok(Some(session))
    }

    pub fn delete_session(&self, id: i64) -> StoreResult<bool> {
        self.delete_by_id("sessions", id)
    }

    // ---- mistakes ----

    pub fn create_mistake(&self, input: NewMistake) -> StoreResult<Mistake> {
        let session = self
            .get_session(input.session_id)?
            .ok_or(StoreError::NotFound("session"))?;
        self.require_student(input.student_id)?;
        if !session.involves(input.student_id) {
            return Err(StoreError::bad_params(format!(
                "student {} did not take part in session {}",
                input.student_id, input.session_id
            )));
        }
        let def = canonical_surah(&input.surah, "surah")?;
        check_ayah(def, input.ayah, "ayah")?;
        let mistake = Mistake {
            id: 0,
            session_id: input.session_id,
            student_id: input.student_id,
            mistake_type: input.mistake_type,
            surah: def.name.to_string(),
            ayah: input.ayah,
            description: input.description.trim().to_string(),
            created_at: now_ts(),
        };
        self.conn
            .execute(
                "INSERT INTO mistakes(session_id, student_id, type, surah, ayah, description,
                 created_at)
                 VALUES(?, ?, ?, ?, ?, ?, ?)",
                params![
                    mistake.session_id,
                    mistake.student_id,
                    mistake.mistake_type.as_str(),
                    mistake.surah,
                    mistake.ayah,
                    mistake.description,
                    mistake.created_at
                ],
            )
            .map_err(StoreError::insert)?;
        Ok(Mistake {
            id: self.conn.last_insert_rowid(),
            ..mistake
        })
    }

    pub fn get_mistake(&self, id: i64) -> StoreResult<Option<Mistake>> {
        self.query_one(
            &format!("SELECT {} FROM mistakes WHERE id = ?", MISTAKE_COLS),
            [id],
            mistake_from_row,
        )
    }

    pub fn list_mistakes(&self) -> StoreResult<Vec<Mistake>> {
        self.query_list(
            &format!("SELECT {} FROM mistakes ORDER BY id", MISTAKE_COLS),
            [],
            mistake_from_row,
        )
    }

    pub fn mistakes_for_session(&self, session_id: i64) -> StoreResult<Vec<Mistake>> {
        self.query_list(
            &format!(
                "SELECT {} FROM mistakes WHERE session_id = ? ORDER BY id",
                MISTAKE_COLS
            ),
            [session_id],
            mistake_from_row,
        )
    }

    /// In creation order.
    pub fn mistakes_for_student(&self, student_id: i64) -> StoreResult<Vec<Mistake>> {
        self.query_list(
            &format!(
                "SELECT {} FROM mistakes WHERE student_id = ? ORDER BY created_at, id",
                MISTAKE_COLS
            ),
            [student_id],
            mistake_from_row,
        )
    }

    pub fn update_mistake(&self, id: i64, patch: MistakePatch) -> StoreResult<Option<Mistake>> {
        let Some(mut mistake) = self.get_mistake(id)? else {
            return Ok(None);
        };
        if let Some(v) = patch.mistake_type {
            mistake.mistake_type = v;
        }
        if let Some(v) = patch.surah {
            mistake.surah = v;
        }
        if let Some(v) = patch.ayah {
            mistake.ayah = v;
        }
        if let Some(v) = patch.description {
            mistake.description = v.trim().to_string();
        }
        let def = canonical_surah(&mistake.surah, "surah")?;
        check_ayah(def, mistake.ayah, "ayah")?;
        mistake.surah = def.name.to_string();
        self.conn
            .execute(
                "UPDATE mistakes SET type = ?, surah = ?, ayah = ?, description = ? WHERE id = ?",
                params![
                    mistake.mistake_type.as_str(),
                    mistake.surah,
                    mistake.ayah,
                    mistake.description,
                    id
                ],
            )
            .map_err(StoreError::update)?;
        Ok(Some(mistake))
    }

    pub fn delete_mistake(&self, id: i64) -> StoreResult<bool> {
        self.delete_by_id("mistakes", id)
    }

    // ---- lessons ----

    pub fn create_lesson(&self, input: NewLesson) -> StoreResult<Lesson> {
        self.require_teacher(input.teacher_id)?;
        self.require_student(input.student_id)?;
        let mut lesson = Lesson {
            id: 0,
            date: check_date(&input.date, "date")?,
            teacher_id: input.teacher_id,
            student_id: input.student_id,
            surah_start: input.surah_start,
            ayah_start: input.ayah_start,
            surah_end: input.surah_end,
            ayah_end: input.ayah_end,
            notes: input.notes.trim().to_string(),
            progress: input.progress,
            created_at: now_ts(),
        };
        check_range(
            &mut lesson.surah_start,
            lesson.ayah_start,
            &mut lesson.surah_end,
            lesson.ayah_end,
        )?;
        self.conn
            .execute(
                "INSERT INTO lessons(date, teacher_id, student_id, surah_start, ayah_start,
                 surah_end, ayah_end, notes, progress, created_at)
                 VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    lesson.date,
                    lesson.teacher_id,
                    lesson.student_id,
                    lesson.surah_start,
                    lesson.ayah_start,
                    lesson.surah_end,
                    lesson.ayah_end,
                    lesson.notes,
                    lesson.progress.as_str(),
                    lesson.created_at
                ],
            )
            .map_err(StoreError::insert)?;
        lesson.id = self.conn.last_insert_rowid();
        Ok(lesson)
    }

    pub fn get_lesson(&self, id: i64) -> StoreResult<Option<Lesson>> {
        self.query_one(
            &format!("SELECT {} FROM lessons WHERE id = ?", LESSON_COLS),
            [id],
            lesson_from_row,
        )
    }

    pub fn list_lessons(&self) -> StoreResult<Vec<Lesson>> {
        self.query_list(
            &format!("SELECT {} FROM lessons ORDER BY id", LESSON_COLS),
            [],
            lesson_from_row,
        )
    }

    pub fn lessons_for_teacher(&self, teacher_id: i64) -> StoreResult<Vec<Lesson>> {
        self.query_list(
            &format!(
                "SELECT {} FROM lessons WHERE teacher_id = ? ORDER BY id",
                LESSON_COLS
            ),
            [teacher_id],
            lesson_from_row,
        )
    }

    pub fn recent_lessons_for_teacher(
        &self,
        teacher_id: i64,
        limit: usize,
    ) -> StoreResult<Vec<Lesson>> {
        self.query_list(
            &format!(
                "SELECT {} FROM lessons WHERE teacher_id = ? ORDER BY date DESC, id DESC LIMIT ?",
                LESSON_COLS
            ),
            params![teacher_id, limit as i64],
            lesson_from_row,
        )
    }

    /// Newest first.
    pub fn lessons_for_student(&self, student_id: i64) -> StoreResult<Vec<Lesson>> {
        self.query_list(
            &format!(
                "SELECT {} FROM lessons WHERE student_id = ? ORDER BY date DESC, id DESC",
                LESSON_COLS
            ),
            [student_id],
            lesson_from_row,
        )
    }

    pub fn update_lesson(&self, id: i64, patch: LessonPatch) -> StoreResult<Option<Lesson>> {
        let Some(mut lesson) = self.get_lesson(id)? else {
            return Ok(None);
        };
        if let Some(v) = patch.date {
            lesson.date = check_date(&v, "date")?;
        }
        if let Some(v) = patch.surah_start {
            lesson.surah_start = v;
        }
        if let Some(v) = patch.ayah_start {
            lesson.ayah_start = v;
        }
        if let Some(v) = patch.surah_end {
            lesson.surah_end = v;
        }
        if let Some(v) = patch.ayah_end {
            lesson.ayah_end = v;
        }
        if let Some(v) = patch.notes {
            lesson.notes = v.trim().to_string();
        }
        if let Some(v) = patch.progress {
            lesson.progress = v;
        }
        check_range(
            &mut lesson.surah_start,
            lesson.ayah_start,
            &mut lesson.surah_end,
            lesson.ayah_end,
        )?;
        self.conn
            .execute(
                "UPDATE lessons
                 SET date = ?, surah_start = ?, ayah_start = ?, surah_end = ?, ayah_end = ?,
                     notes = ?, progress = ?
                 WHERE id = ?",
                params![
                    lesson.date,
                    lesson.surah_start,
                    lesson.ayah_start,
                    lesson.surah_end,
                    lesson.ayah_end,
                    lesson.notes,
                    lesson.progress.as_str(),
                    id
                ],
            )
            .map_err(StoreError::update)?;
        Ok(Some(lesson))
    }

    pub fn delete_lesson(&self, id: i64) -> StoreResult<bool> {
        self.delete_by_id("lessons", id)
    }

    // ---- lesson mistakes ----

    pub fn create_lesson_mistake(&self, input: NewLessonMistake) -> StoreResult<LessonMistake> {
        let lesson = self
            .get_lesson(input.lesson_id)?
            .ok_or(StoreError::NotFound("lesson"))?;
        let def = canonical_surah(&input.surah, "surah")?;
        check_ayah(def, input.ayah, "ayah")?;
        let mistake = LessonMistake {
            id: 0,
            lesson_id: lesson.id,
            student_id: lesson.student_id,
            mistake_type: input.mistake_type,
            surah: def.name.to_string(),
            ayah: input.ayah,
            description: input.description.trim().to_string(),
            created_at: now_ts(),
        };
        self.conn
            .execute(
                "INSERT INTO lesson_mistakes(lesson_id, student_id, type, surah, ayah,
                 description, created_at)
                 VALUES(?, ?, ?, ?, ?, ?, ?)",
                params![
                    mistake.lesson_id,
                    mistake.student_id,
                    mistake.mistake_type.as_str(),
                    mistake.surah,
                    mistake.ayah,
                    mistake.description,
                    mistake.created_at
                ],
            )
            .map_err(StoreError::insert)?;
        Ok(LessonMistake {
            id: self.conn.last_insert_rowid(),
            ..mistake
        })
    }

    pub fn lesson_mistakes_for_lesson(&self, lesson_id: i64) -> StoreResult<Vec<LessonMistake>> {
        self.query_list(
            &format!(
                "SELECT {} FROM lesson_mistakes WHERE lesson_id = ? ORDER BY id",
                MISTAKE_COLS.replace("session_id", "lesson_id")
            ),
            [lesson_id],
            lesson_mistake_from_row,
        )
    }

    pub fn lesson_mistakes_for_student(&self, student_id: i64) -> StoreResult<Vec<LessonMistake>> {
        self.query_list(
            &format!(
                "SELECT {} FROM lesson_mistakes WHERE student_id = ? ORDER BY id",
                MISTAKE_COLS.replace("session_id", "lesson_id")
            ),
            [student_id],
            lesson_mistake_from_row,
        )
    }

    fn count_lesson_mistakes_for_teacher(&self, teacher_id: i64) -> StoreResult<usize> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM lesson_mistakes lm
                 JOIN lessons l ON l.id = lm.lesson_id
                 WHERE l.teacher_id = ?",
                [teacher_id],
                |r| r.get::<_, i64>(0),
            )
            .map(|n| n as usize)
            .map_err(StoreError::query)
    }

    pub fn delete_lesson_mistake(&self, id: i64) -> StoreResult<bool> {
        self.delete_by_id("lesson_mistakes", id)
    }

    // ---- statistics ----

    pub fn student_with_stats(&self, student_id: i64) -> StoreResult<Option<StudentWithStats>> {
        let Some(student) = self.get_student(student_id)? else {
            return Ok(None);
        };
        let sessions = self.sessions_for_student(student_id)?;
        let mistakes = self.mistakes_for_student(student_id)?;
        Ok(Some(calc::student_with_stats(student, &sessions, &mistakes)))
    }

    pub fn all_students_with_stats(&self) -> StoreResult<Vec<StudentWithStats>> {
        let sessions = self.list_sessions()?;
        let mistakes = self.list_mistakes()?;
        Ok(self
            .list_students()?
            .into_iter()
            .map(|s| calc::student_with_stats(s, &sessions, &mistakes))
            .collect())
    }

    pub fn mistake_type_distribution(&self) -> StoreResult<MistakeDistribution> {
        let mistakes = self.list_mistakes()?;
        Ok(calc::mistake_type_distribution(
            mistakes.iter().map(|m| m.mistake_type),
        ))
    }

    pub fn session_days(&self) -> StoreResult<Vec<WeekdayCount>> {
        Ok(calc::sessions_by_weekday(&self.list_sessions()?))
    }

    /// Overall mistakes per session, one decimal.
    pub fn average_mistakes_per_session(&self) -> StoreResult<f64> {
        let (mistakes, sessions): (i64, i64) = self
            .conn
            .query_row(
                "SELECT (SELECT COUNT(*) FROM mistakes), (SELECT COUNT(*) FROM sessions)",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .map_err(StoreError::query)?;
        Ok(calc::round_off_1_decimal(calc::average_mistakes(
            mistakes as usize,
            sessions as usize,
        )))
    }

    pub fn mistake_trend(&self, days: usize, as_of: NaiveDate) -> StoreResult<Vec<TrendPoint>> {
        let mistakes = self.list_mistakes()?;
        Ok(calc::mistake_trend(
            mistakes.iter().map(|m| m.created_at.as_str()),
            as_of,
            days,
        ))
    }

    pub fn student_progress(
        &self,
        student_id: i64,
        days: usize,
        as_of: NaiveDate,
    ) -> StoreResult<Vec<ProgressPoint>> {
        let mistakes = self.mistakes_for_student(student_id)?;
        Ok(calc::student_progress(&mistakes, as_of, days))
    }

    pub fn teacher_lesson_stats(&self, teacher_id: i64) -> StoreResult<TeacherLessonStats> {
        let lessons = self.lessons_for_teacher(teacher_id)?;
        let linked = self.linked_student_ids(teacher_id)?;
        let mistakes = self.count_lesson_mistakes_for_teacher(teacher_id)?;
        Ok(calc::teacher_lesson_stats(&lessons, &linked, mistakes))
    }

    pub fn student_lesson_progress(
        &self,
        student_id: i64,
        days: usize,
        as_of: NaiveDate,
    ) -> StoreResult<Vec<LessonProgressPoint>> {
        let lessons = self.lessons_for_student(student_id)?;
        let mistakes = self.lesson_mistakes_for_student(student_id)?;
        Ok(calc::student_lesson_progress(&lessons, &mistakes, as_of, days))
    }

    // ---- snapshots ----

    pub fn export_snapshot(&self) -> StoreResult<Snapshot> {
        let teacher_students = self.query_list(
            "SELECT teacher_id, student_id FROM teacher_students ORDER BY teacher_id, student_id",
            [],
            |r| {
                Ok(TeacherStudent {
                    teacher_id: r.get(0)?,
                    student_id: r.get(1)?,
                })
            },
        )?;
        let lesson_mistakes = self.query_list(
            &format!(
                "SELECT {} FROM lesson_mistakes ORDER BY id",
                MISTAKE_COLS.replace("session_id", "lesson_id")
            ),
            [],
            lesson_mistake_from_row,
        )?;
        let settings_rows: Vec<(String, String)> = self.query_list(
            "SELECT key, value_json FROM settings ORDER BY key",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;
        let settings = settings_rows
            .into_iter()
            .filter_map(|(k, v)| serde_json::from_str(&v).ok().map(|v| (k, v)))
            .collect();
        Ok(Snapshot {
            users: self.list_users(None)?,
            students: self.list_students()?,
            teacher_students,
            sessions: self.list_sessions()?,
            mistakes: self.list_mistakes()?,
            lessons: self.list_lessons()?,
            lesson_mistakes,
            settings,
        })
    }

    /// Replaces every collection with `snapshot`, keeping its ids.
    pub fn replace_with_snapshot(&self, snapshot: &Snapshot) -> StoreResult<()> {
        check_snapshot(snapshot)?;
        let tx = self.conn.unchecked_transaction().map_err(StoreError::tx)?;
        for table in [
            "lesson_mistakes",
            "lessons",
            "mistakes",
            "sessions",
            "teacher_students",
            "students",
            "users",
            "settings",
        ] {
            tx.execute(&format!("DELETE FROM {}", table), [])
                .map_err(StoreError::delete)?;
        }
        for u in &snapshot.users {
            tx.execute(
                "INSERT INTO users(id, username, name, role, created_at) VALUES(?, ?, ?, ?, ?)",
                params![u.id, u.username, u.name, u.role.as_str(), u.created_at],
            )
            .map_err(StoreError::insert)?;
        }
        for s in &snapshot.students {
            let completed =
                serde_json::to_string(&s.completed_juz).unwrap_or_else(|_| "[]".to_string());
            tx.execute(
                "INSERT INTO students(id, user_id, name, grade, current_juz, completed_juz,
                 current_surah, current_ayah, notes, created_at)
                 VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    s.id,
                    s.user_id,
                    s.name,
                    s.grade,
                    s.current_juz,
                    completed,
                    s.current_surah,
                    s.current_ayah,
                    s.notes,
                    s.created_at
                ],
            )
            .map_err(StoreError::insert)?;
        }
        for l in &snapshot.teacher_students {
            tx.execute(
                "INSERT INTO teacher_students(teacher_id, student_id) VALUES(?, ?)",
                params![l.teacher_id, l.student_id],
            )
            .map_err(StoreError::insert)?;
        }
        for s in &snapshot.sessions {
            tx.execute(
                "INSERT INTO sessions(id, date, student1_id, student2_id, surah_start,
                 ayah_start, surah_end, ayah_end, completed, created_at)
                 VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    s.id,
                    s.date,
                    s.student1_id,
                    s.student2_id,
                    s.surah_start,
                    s.ayah_start,
                    s.surah_end,
                    s.ayah_end,
                    s.completed,
                    s.created_at
                ],
            )
            .map_err(StoreError::insert)?;
        }
        for m in &snapshot.mistakes {
            tx.execute(
                "INSERT INTO mistakes(id, session_id, student_id, type, surah, ayah, description,
                 created_at)
                 VALUES(?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    m.id,
                    m.session_id,
                    m.student_id,
                    m.mistake_type.as_str(),
                    m.surah,
                    m.ayah,
                    m.description,
                    m.created_at
                ],
            )
            .map_err(StoreError::insert)?;
        }
        for l in &snapshot.lessons {
            tx.execute(
                "INSERT INTO lessons(id, date, teacher_id, student_id, surah_start, ayah_start,
                 surah_end, ayah_end, notes, progress, created_at)
                 VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    l.id,
                    l.date,
                    l.teacher_id,
                    l.student_id,
                    l.surah_start,
                    l.ayah_start,
                    l.surah_end,
                    l.ayah_end,
                    l.notes,
                    l.progress.as_str(),
                    l.created_at
                ],
            )
            .map_err(StoreError::insert)?;
        }
        for m in &snapshot.lesson_mistakes {
            tx.execute(
                "INSERT INTO lesson_mistakes(id, lesson_id, student_id, type, surah, ayah,
                 description, created_at)
                 VALUES(?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    m.id,
                    m.lesson_id,
                    m.student_id,
                    m.mistake_type.as_str(),
                    m.surah,
                    m.ayah,
                    m.description,
                    m.created_at
                ],
            )
            .map_err(StoreError::insert)?;
        }
        for (key, value) in &snapshot.settings {
            tx.execute(
                "INSERT INTO settings(key, value_json) VALUES(?, ?)",
                params![key, value.to_string()],
            )
            .map_err(StoreError::insert)?;
        }
        tx.commit().map_err(StoreError::tx)
    }
}
