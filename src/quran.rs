use serde::Serialize;
use std::collections::BTreeSet;

pub const JUZ_COUNT: u8 = 30;

#[derive(Debug, Clone, Copy)]
pub struct SurahDef {
    pub number: u8,
    pub name: &'static str,
    pub ayah_count: u16,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurahSummary {
    pub number: u8,
    pub name: &'static str,
    pub ayah_count: u16,
    pub juz: Vec<u8>,
}

const fn s(number: u8, name: &'static str, ayah_count: u16) -> SurahDef {
    SurahDef {
        number,
        name,
        ayah_count,
    }
}

pub const SURAHS: [SurahDef; 114] = [
    s(1, "Al-Fatihah", 7),
    s(2, "Al-Baqarah", 286),
    s(3, "Ali 'Imran", 200),
    s(4, "An-Nisa", 176),
    s(5, "Al-Ma'idah", 120),
    s(6, "Al-An'am", 165),
    s(7, "Al-A'raf", 206),
    s(8, "Al-Anfal", 75),
    s(9, "At-Tawbah", 129),
    s(10, "Yunus", 109),
    s(11, "Hud", 123),
    s(12, "Yusuf", 111),
    s(13, "Ar-Ra'd", 43),
    s(14, "Ibrahim", 52),
    s(15, "Al-Hijr", 99),
    s(16, "An-Nahl", 128),
    s(17, "Al-Isra", 111),
    s(18, "Al-Kahf", 110),
    s(19, "Maryam", 98),
    s(20, "Taha", 135),
    s(21, "Al-Anbya", 112),
    s(22, "Al-Hajj", 78),
    s(23, "Al-Mu'minun", 118),
    s(24, "An-Nur", 64),
    s(25, "Al-Furqan", 77),
    s(26, "Ash-Shu'ara", 227),
    s(27, "An-Naml", 93),
    s(28, "Al-Qasas", 88),
    s(29, "Al-'Ankabut", 69),
    s(30, "Ar-Rum", 60),
    s(31, "Luqman", 34),
    s(32, "As-Sajdah", 30),
    s(33, "Al-Ahzab", 73),
    s(34, "Saba", 54),
    s(35, "Fatir", 45),
    s(36, "Ya-Sin", 83),
    s(37, "As-Saffat", 182),
    s(38, "Sad", 88),
    s(39, "Az-Zumar", 75),
    s(40, "Ghafir", 85),
    s(41, "Fussilat", 54),
    s(42, "Ash-Shuraa", 53),
    s(43, "Az-Zukhruf", 89),
    s(44, "Ad-Dukhan", 59),
    s(45, "Al-Jathiyah", 37),
    s(46, "Al-Ahqaf", 35),
    s(47, "Muhammad", 38),
    s(48, "Al-Fath", 29),
    s(49, "Al-Hujurat", 18),
    s(50, "Qaf", 45),
    s(51, "Adh-Dhariyat", 60),
    s(52, "At-Tur", 49),
    s(53, "An-Najm", 62),
    s(54, "Al-Qamar", 55),
    s(55, "Ar-Rahman", 78),
    s(56, "Al-Waqi'ah", 96),
    s(57, "Al-Hadid", 29),
    s(58, "Al-Mujadila", 22),
    s(59, "Al-Hashr", 24),
    s(60, "Al-Mumtahanah", 13),
    s(61, "As-Saf", 14),
    s(62, "Al-Jumu'ah", 11),
    s(63, "Al-Munafiqun", 11),
    s(64, "At-Taghabun", 18),
    s(65, "At-Talaq", 12),
    s(66, "At-Tahrim", 12),
    s(67, "Al-Mulk", 30),
    s(68, "Al-Qalam", 52),
    s(69, "Al-Haqqah", 52),
    s(70, "Al-Ma'arij", 44),
    s(71, "Nuh", 28),
    s(72, "Al-Jinn", 28),
    s(73, "Al-Muzzammil", 20),
    s(74, "Al-Muddaththir", 56),
    s(75, "Al-Qiyamah", 40),
    s(76, "Al-Insan", 31),
    s(77, "Al-Mursalat", 50),
    s(78, "An-Naba", 40),
    s(79, "An-Nazi'at", 46),
    s(80, "'Abasa", 42),
    s(81, "At-Takwir", 29),
    s(82, "Al-Infitar", 19),
    s(83, "Al-Mutaffifin", 36),
    s(84, "Al-Inshiqaq", 25),
    s(85, "Al-Buruj", 22),
    s(86, "At-Tariq", 17),
    s(87, "Al-A'la", 19),
    s(88, "Al-Ghashiyah", 26),
    s(89, "Al-Fajr", 30),
    s(90, "Al-Balad", 20),
    s(91, "Ash-Shams", 15),
    s(92, "Al-Layl", 21),
    s(93, "Ad-Duhaa", 11),
    s(94, "Ash-Sharh", 8),
    s(95, "At-Tin", 8),
    s(96, "Al-'Alaq", 19),
    s(97, "Al-Qadr", 5),
    s(98, "Al-Bayyinah", 8),
    s(99, "Az-Zalzalah", 8),
    s(100, "Al-'Adiyat", 11),
    s(101, "Al-Qari'ah", 11),
    s(102, "At-Takathur", 8),
    s(103, "Al-'Asr", 3),
    s(104, "Al-Humazah", 9),
    s(105, "Al-Fil", 5),
    s(106, "Quraysh", 4),
    s(107, "Al-Ma'un", 7),
    s(108, "Al-Kawthar", 3),
    s(109, "Al-Kafirun", 6),
    s(110, "An-Nasr", 3),
    s(111, "Al-Masad", 5),
    s(112, "Al-Ikhlas", 4),
    s(113, "Al-Falaq", 5),
    s(114, "An-Nas", 6),
];

/// First (surah, ayah) of each juz, in order.
const JUZ_STARTS: [(u8, u16); 30] = [
    (1, 1),
    (2, 142),
    (2, 253),
    (3, 93),
    (4, 24),
    (4, 148),
    (5, 82),
    (6, 111),
    (7, 88),
    (8, 41),
    (9, 93),
    (11, 6),
    (12, 53),
    (15, 1),
    (17, 1),
    (18, 75),
    (21, 1),
    (23, 1),
    (25, 21),
    (27, 56),
    (29, 46),
    (33, 31),
    (36, 28),
    (39, 32),
    (41, 47),
    (46, 1),
    (51, 31),
    (58, 1),
    (67, 1),
    (78, 1),
];

/// Resolves a surah by transliterated name (case-insensitive) or by number.
pub fn find_surah(key: &str) -> Option<&'static SurahDef> {
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    if let Ok(n) = key.parse::<u8>() {
        return SURAHS.get(usize::from(n).checked_sub(1)?);
    }
    SURAHS.iter().find(|d| d.name.eq_ignore_ascii_case(key))
}

fn juz_at(surah: u8, ayah: u16) -> u8 {
    JUZ_STARTS
        .iter()
        .take_while(|start| **start <= (surah, ayah))
        .count() as u8
}

/// Every juz the surah touches, ascending.
pub fn surah_juz_span(surah: &str) -> Option<Vec<u8>> {
    let def = find_surah(surah)?;
    let first = juz_at(def.number, 1);
    let last = juz_at(def.number, def.ayah_count);
    Some((first..=last).collect())
}

/// Juz for a recitation position.
///
/// A surah spanning several juz always maps to the first one; `ayah` is not
/// consulted.
pub fn get_surah_juz(surah: &str, _ayah: Option<i64>) -> Option<u8> {
    let def = find_surah(surah)?;
    Some(juz_at(def.number, 1))
}

/// A juz counts as completed once the current position has moved past it.
pub fn is_juz_completed(juz: u8, current_surah: &str, current_ayah: Option<i64>) -> bool {
    match get_surah_juz(current_surah, current_ayah) {
        Some(current) => juz < current,
        None => false,
    }
}

/// Merges the juz completed at the current position into `existing`.
/// The result is sorted, deduplicated and never smaller than `existing`.
pub fn update_completed_juz(
    existing: &[u8],
    current_surah: &str,
    current_ayah: Option<i64>,
) -> Vec<u8> {
    let mut out: BTreeSet<u8> = existing.iter().copied().collect();
    for juz in 1..=JUZ_COUNT {
        if is_juz_completed(juz, current_surah, current_ayah) {
            out.insert(juz);
        }
    }
    out.into_iter().collect()
}

pub fn surah_table() -> Vec<SurahSummary> {
    SURAHS
        .iter()
        .map(|d| SurahSummary {
            number: d.number,
            name: d.name,
            ayah_count: d.ayah_count,
            juz: (juz_at(d.number, 1)..=juz_at(d.number, d.ayah_count)).collect(),
        })
        .collect()
}
