mod test_support;

use serde_json::json;
use test_support::{error_code, request, request_ok, spawn_sidecar};

#[test]
fn lessons_feed_teacher_stats_and_student_lesson_progress() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let teacher = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "users.create",
        json!({ "username": "t1", "name": "Teacher", "role": "teacher" }),
    );
    let teacher_id = teacher["user"]["id"].as_i64().expect("teacher");
    let account = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "users.create",
        json!({ "username": "s1", "name": "Safiya", "role": "student" }),
    );
    let user_id = account["user"]["id"].as_i64().expect("account");

    let safiya = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "students.create",
        json!({ "name": "Safiya", "userId": user_id }),
    );
    let safiya_id = safiya["student"]["id"].as_i64().expect("safiya");
    let other = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "students.create",
        json!({ "name": "Huda" }),
    );
    let other_id = other["student"]["id"].as_i64().expect("other");
    request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "teacher.students.link",
        json!({ "teacherId": teacher_id, "studentId": other_id }),
    );

    let l1 = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "lessons.create",
        json!({
            "date": "2026-10-15",
            "teacherId": teacher_id,
            "studentId": safiya_id,
            "surahStart": "Al-Mulk",
            "ayahStart": 1,
            "surahEnd": "Al-Mulk",
            "ayahEnd": 15,
            "progress": "Completed"
        }),
    );
    let l1_id = l1["lesson"]["id"].as_i64().expect("l1");
    assert_eq!(l1["lesson"]["progress"].as_str(), Some("Completed"));

    let l2 = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "lessons.create",
        json!({
            "date": "2026-10-16",
            "teacherId": teacher_id,
            "studentId": safiya_id,
            "surahStart": "Al-Mulk",
            "ayahStart": 16,
            "surahEnd": "Al-Mulk",
            "ayahEnd": 30
        }),
    );
    let l2_id = l2["lesson"]["id"].as_i64().expect("l2");
    assert_eq!(l2["lesson"]["progress"].as_str(), Some("NotStarted"));

    for (i, ayah) in [3, 7, 9].iter().enumerate() {
        let m = request_ok(
            &mut stdin,
            &mut reader,
            &format!("lm{}", i),
            "lessons.mistakes.create",
            json!({ "lessonId": l1_id, "type": "tajweed", "surah": "Al-Mulk", "ayah": ayah }),
        );
        assert_eq!(m["mistake"]["studentId"].as_i64(), Some(safiya_id));
    }
    let bad_progress = request(
        &mut stdin,
        &mut reader,
        "8",
        "lessons.update",
        json!({ "id": l2_id, "patch": { "progress": "completed" } }),
    );
    assert_eq!(error_code(&bad_progress), "bad_params");
    request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "lessons.update",
        json!({ "id": l2_id, "patch": { "progress": "InProgress", "notes": "revise 16-20" } }),
    );

    let stats = request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "teacher.stats",
        json!({ "teacherId": teacher_id }),
    );
    assert_eq!(stats["totalLessons"].as_i64(), Some(2));
    assert_eq!(stats["completedLessons"].as_i64(), Some(1));
    assert_eq!(stats["uniqueStudents"].as_i64(), Some(2));
    assert_eq!(stats["averageMistakesPerLesson"].as_f64(), Some(1.5));

    let recent = request_ok(
        &mut stdin,
        &mut reader,
        "11",
        "teacher.lessons.recent",
        json!({ "teacherId": teacher_id, "limit": 1 }),
    );
    let lessons = recent["lessons"].as_array().expect("lessons");
    assert_eq!(lessons.len(), 1);
    assert_eq!(lessons[0]["id"].as_i64(), Some(l2_id));

    let mine = request_ok(
        &mut stdin,
        &mut reader,
        "12",
        "student.lessons",
        json!({ "userId": user_id }),
    );
    assert_eq!(mine["lessons"].as_array().map(|a| a.len()), Some(2));

    let progress = request_ok(
        &mut stdin,
        &mut reader,
        "13",
        "student.lessonProgress",
        json!({ "userId": user_id, "days": 3, "asOf": "2026-10-16" }),
    );
    assert_eq!(
        progress["points"],
        json!([
            { "date": "2026-10-14", "lessons": 0, "mistakes": 0 },
            { "date": "2026-10-15", "lessons": 1, "mistakes": 3 },
            { "date": "2026-10-16", "lessons": 1, "mistakes": 0 }
        ])
    );

    let detail = request_ok(&mut stdin, &mut reader, "14", "lessons.get", json!({ "id": l1_id }));
    assert_eq!(detail["mistakes"].as_array().map(|a| a.len()), Some(3));

    request_ok(&mut stdin, &mut reader, "15", "lessons.delete", json!({ "id": l1_id }));
    let listed = request(
        &mut stdin,
        &mut reader,
        "16",
        "lessons.mistakes.list",
        json!({ "lessonId": l1_id }),
    );
    assert_eq!(error_code(&listed), "not_found");

    let by_student = request_ok(
        &mut stdin,
        &mut reader,
        "17",
        "lessons.list",
        json!({ "studentId": safiya_id }),
    );
    assert_eq!(by_student["lessons"].as_array().map(|a| a.len()), Some(1));

    let student_teacher = request(
        &mut stdin,
        &mut reader,
        "18",
        "lessons.create",
        json!({
            "date": "2026-10-16",
            "teacherId": user_id,
            "studentId": safiya_id,
            "surahStart": "Al-Mulk",
            "ayahStart": 1,
            "surahEnd": "Al-Mulk",
            "ayahEnd": 2
        }),
    );
    assert_eq!(error_code(&student_teacher), "bad_params");

    let _ = child.kill();
}
