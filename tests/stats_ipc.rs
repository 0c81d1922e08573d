mod test_support;

use serde_json::json;
use std::io::BufReader;
use std::process::{ChildStdin, ChildStdout};
use test_support::{error_code, request, request_ok, spawn_sidecar};

fn seed_pair(stdin: &mut ChildStdin, reader: &mut BufReader<ChildStdout>) -> (i64, i64) {
    let a = request_ok(stdin, reader, "pa", "students.create", json!({ "name": "Hamza" }));
    let b = request_ok(stdin, reader, "pb", "students.create", json!({ "name": "Idris" }));
    (
        a["student"]["id"].as_i64().expect("a"),
        b["student"]["id"].as_i64().expect("b"),
    )
}

fn create_session(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    date: &str,
    a: i64,
    b: i64,
) -> i64 {
    let s = request_ok(
        stdin,
        reader,
        id,
        "sessions.create",
        json!({
            "date": date,
            "student1Id": a,
            "student2Id": b,
            "surahStart": "Al-Kahf",
            "ayahStart": 1,
            "surahEnd": "Al-Kahf",
            "ayahEnd": 10
        }),
    );
    s["session"]["id"].as_i64().expect("session id")
}

#[test]
fn empty_store_reports_zeroes() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let avg = request_ok(&mut stdin, &mut reader, "1", "stats.averageMistakes", json!({}));
    assert_eq!(avg["averageMistakes"].as_f64(), Some(0.0));

    let dist = request_ok(&mut stdin, &mut reader, "2", "stats.mistakeDistribution", json!({}));
    assert_eq!(dist, json!({ "tajweed": 0, "word": 0, "stuck": 0 }));

    let days = request_ok(&mut stdin, &mut reader, "3", "stats.sessionDays", json!({}));
    let names: Vec<&str> = days["days"]
        .as_array()
        .expect("days")
        .iter()
        .filter_map(|d| d["day"].as_str())
        .collect();
    assert_eq!(names, vec!["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]);
    assert!(days["days"]
        .as_array()
        .expect("days")
        .iter()
        .all(|d| d["count"].as_i64() == Some(0)));

    let trend = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "stats.mistakeTrend",
        json!({ "days": 5, "asOf": "2026-03-01" }),
    );
    let dates: Vec<&str> = trend["points"]
        .as_array()
        .expect("points")
        .iter()
        .filter_map(|p| p["date"].as_str())
        .collect();
    assert_eq!(
        dates,
        vec!["2026-02-25", "2026-02-26", "2026-02-27", "2026-02-28", "2026-03-01"]
    );

    let _ = child.kill();
}

#[test]
fn distribution_weekdays_and_average() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let (a, b) = seed_pair(&mut stdin, &mut reader);

    // 2026-10-17 and 2026-10-24 are Saturdays, 2026-10-19 a Monday.
    let s1 = create_session(&mut stdin, &mut reader, "s1", "2026-10-17", a, b);
    create_session(&mut stdin, &mut reader, "s2", "2026-10-19", b, a);
    create_session(&mut stdin, &mut reader, "s3", "2026-10-24", a, b);

    let kinds = [
        "tajweed", "tajweed", "tajweed", "tajweed", "word", "word", "word", "stuck", "stuck",
        "stuck",
    ];
    for (i, kind) in kinds.iter().enumerate() {
        request_ok(
            &mut stdin,
            &mut reader,
            &format!("m{}", i),
            "mistakes.create",
            json!({ "sessionId": s1, "studentId": a, "type": kind, "surah": "Al-Kahf", "ayah": 5 }),
        );
    }

    let dist = request_ok(&mut stdin, &mut reader, "d", "stats.mistakeDistribution", json!({}));
    assert_eq!(dist, json!({ "tajweed": 40, "word": 30, "stuck": 30 }));

    let days = request_ok(&mut stdin, &mut reader, "w", "stats.sessionDays", json!({}));
    let arr = days["days"].as_array().expect("days");
    assert_eq!(arr[1]["day"].as_str(), Some("Mon"));
    assert_eq!(arr[1]["count"].as_i64(), Some(1));
    assert_eq!(arr[6]["day"].as_str(), Some("Sat"));
    assert_eq!(arr[6]["count"].as_i64(), Some(2));

    let avg = request_ok(&mut stdin, &mut reader, "avg", "stats.averageMistakes", json!({}));
    assert_eq!(avg["averageMistakes"].as_f64(), Some(3.3));

    let _ = child.kill();
}

#[test]
fn trend_counts_todays_mistakes_and_validates_days() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let (a, b) = seed_pair(&mut stdin, &mut reader);
    let s = create_session(&mut stdin, &mut reader, "s", "2026-10-01", a, b);
    for i in 0..2 {
        request_ok(
            &mut stdin,
            &mut reader,
            &format!("m{}", i),
            "mistakes.create",
            json!({
                "sessionId": s,
                "studentId": b,
                "type": "word",
                "surah": "Al-Kahf",
                "ayah": 2
            }),
        );
    }

    let trend = request_ok(
        &mut stdin,
        &mut reader,
        "t",
        "stats.mistakeTrend",
        json!({ "days": 3 }),
    );
    let points = trend["points"].as_array().expect("points");
    assert_eq!(points.len(), 3);
    let total: i64 = points.iter().filter_map(|p| p["count"].as_i64()).sum();
    assert_eq!(total, 2);
    assert_eq!(points[2]["date"], trend["asOf"]);
    assert!(points.windows(2).all(|w| w[0]["date"].as_str() < w[1]["date"].as_str()));

    let default_days = request_ok(&mut stdin, &mut reader, "t7", "stats.mistakeTrend", json!({}));
    assert_eq!(default_days["points"].as_array().map(|a| a.len()), Some(7));

    for (id, days) in [("z", 0), ("big", 366)] {
        let bad = request(
            &mut stdin,
            &mut reader,
            id,
            "stats.mistakeTrend",
            json!({ "days": days }),
        );
        assert_eq!(error_code(&bad), "bad_params");
    }
    let bad_date = request(
        &mut stdin,
        &mut reader,
        "bd",
        "stats.mistakeTrend",
        json!({ "asOf": "yesterday" }),
    );
    assert_eq!(error_code(&bad_date), "bad_params");

    let _ = child.kill();
}

#[test]
fn out_of_range_report_dates_are_rejected_and_daemon_survives() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let user = request_ok(
        &mut stdin,
        &mut reader,
        "u",
        "users.create",
        json!({ "username": "yusuf", "name": "Yusuf", "role": "student" }),
    );
    let user_id = user["user"]["id"].as_i64().expect("user id");
    request_ok(
        &mut stdin,
        &mut reader,
        "s",
        "students.create",
        json!({ "name": "Yusuf", "userId": user_id }),
    );

    for (i, as_of) in ["-262143-01-01", "+262142-12-31", "0000-06-01"].iter().enumerate() {
        let trend = request(
            &mut stdin,
            &mut reader,
            &format!("t{}", i),
            "stats.mistakeTrend",
            json!({ "days": 365, "asOf": as_of }),
        );
        assert_eq!(error_code(&trend), "bad_params");
        for method in ["student.progress", "student.lessonProgress"] {
            let resp = request(
                &mut stdin,
                &mut reader,
                &format!("{}-{}", method, i),
                method,
                json!({ "userId": user_id, "days": 365, "asOf": as_of }),
            );
            assert_eq!(error_code(&resp), "bad_params");
        }
    }

    let earliest = request_ok(
        &mut stdin,
        &mut reader,
        "early",
        "stats.mistakeTrend",
        json!({ "days": 365, "asOf": "0001-01-01" }),
    );
    let points = earliest["points"].as_array().expect("points");
    assert_eq!(points.last().and_then(|p| p["date"].as_str()), Some("0001-01-01"));

    let health = request_ok(&mut stdin, &mut reader, "h", "health", json!({}));
    assert!(health["version"].is_string());

    let _ = child.kill();
}
