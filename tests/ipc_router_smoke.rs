mod test_support;

use serde_json::json;
use test_support::{error_code, request, send_raw, spawn_sidecar, temp_dir};

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let dir = temp_dir("hifzd-router-smoke");
    let bundle_out = dir.join("smoke.zip");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let methods = [
        ("health", json!({})),
        ("setup.get", json!({})),
        ("users.list", json!({})),
        ("students.list", json!({})),
        ("students.stats", json!({})),
        ("sessions.list", json!({})),
        ("sessions.recent", json!({})),
        ("mistakes.list", json!({})),
        ("lessons.list", json!({})),
        ("stats.mistakeDistribution", json!({})),
        ("stats.sessionDays", json!({})),
        ("stats.averageMistakes", json!({})),
        ("stats.mistakeTrend", json!({ "days": 2 })),
        ("quran.surahs", json!({})),
        ("quran.surahJuz", json!({ "surah": "Al-Baqarah", "ayah": 200 })),
        (
            "backup.exportBundle",
            json!({ "outPath": bundle_out.to_string_lossy() }),
        ),
    ];
    for (i, (method, params)) in methods.iter().enumerate() {
        let resp = request(&mut stdin, &mut reader, &format!("{}", i), method, params.clone());
        assert_eq!(
            resp.get("ok").and_then(|v| v.as_bool()),
            Some(true),
            "{} failed: {}",
            method,
            resp
        );
    }

    // Families that need ids still route and fail with a typed error.
    let scoped = [
        ("students.get", "not_found"),
        ("students.getWithStats", "not_found"),
        ("sessions.get", "not_found"),
        ("sessions.forStudent", "bad_params"),
        ("mistakes.forSession", "bad_params"),
        ("lessons.get", "not_found"),
        ("lessons.mistakes.list", "bad_params"),
        ("teacher.stats", "bad_params"),
        ("student.progress", "bad_params"),
    ];
    for (i, (method, code)) in scoped.iter().enumerate() {
        let params = if *code == "not_found" { json!({ "id": 404 }) } else { json!({}) };
        let resp = request(&mut stdin, &mut reader, &format!("x{}", i), method, params);
        assert_eq!(error_code(&resp), *code, "{}", method);
    }

    let unknown = request(&mut stdin, &mut reader, "u", "grades.list", json!({}));
    assert_eq!(error_code(&unknown), "not_implemented");

    let garbage = send_raw(&mut stdin, &mut reader, "{not json");
    assert_eq!(error_code(&garbage), "bad_json");

    let juz = request(
        &mut stdin,
        &mut reader,
        "j",
        "quran.surahJuz",
        json!({ "surah": "al-baqarah", "ayah": 250 }),
    );
    assert_eq!(juz["result"]["juz"].as_i64(), Some(1));
    assert_eq!(juz["result"]["span"], json!([1, 2, 3]));
    assert_eq!(juz["result"]["surah"].as_str(), Some("Al-Baqarah"));

    let unknown_surah = request(
        &mut stdin,
        &mut reader,
        "k",
        "quran.surahJuz",
        json!({ "surah": "Al-Unknown" }),
    );
    assert_eq!(error_code(&unknown_surah), "not_found");

    let _ = child.kill();
    let _ = std::fs::remove_dir_all(dir);
}
