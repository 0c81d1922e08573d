use crate::ipc::helpers::{optional_i64, required_str, respond, HandlerErr, HandlerResult};
use crate::ipc::types::{AppState, Request};
use crate::quran;
use serde_json::json;

fn handle_quran_surahs(_state: &mut AppState, _req: &Request) -> HandlerResult {
    Ok(json!({ "surahs": quran::surah_table() }))
}

fn handle_quran_surah_juz(_state: &mut AppState, req: &Request) -> HandlerResult {
    let surah = required_str(&req.params, "surah")?;
    let ayah = optional_i64(&req.params, "ayah")?;
    let Some(def) = quran::find_surah(&surah) else {
        return Err(HandlerErr {
            code: "not_found",
            message: "surah not found".into(),
            details: Some(json!({ "surah": surah })),
        });
    };
    Ok(json!({
        "surah": def.name,
        "number": def.number,
        "juz": quran::get_surah_juz(def.name, ayah),
        "span": quran::surah_juz_span(def.name)
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "quran.surahs" => handle_quran_surahs(state, req),
        "quran.surahJuz" => handle_quran_surah_juz(state, req),
        _ => return None,
    };
    Some(respond(req, result))
}
