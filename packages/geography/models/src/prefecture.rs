//! The 47 prefectures.
//!
//! Provides mappings between prefecture codes, Japanese names, and
//! macro-regions.

use crate::{MacroRegion, Prefecture};

const fn pref(code: u8, name: &'static str, region: MacroRegion) -> Prefecture {
    Prefecture { code, name, region }
}

/// Every prefecture in code order.
pub const PREFECTURES: [Prefecture; 47] = [
    pref(1, "北海道", MacroRegion::Hokkaido),
    pref(2, "青森県", MacroRegion::Tohoku),
    pref(3, "岩手県", MacroRegion::Tohoku),
    pref(4, "宮城県", MacroRegion::Tohoku),
    pref(5, "秋田県", MacroRegion::Tohoku),
    pref(6, "山形県", MacroRegion::Tohoku),
    pref(7, "福島県", MacroRegion::Tohoku),
    pref(8, "茨城県", MacroRegion::Kanto),
    pref(9, "栃木県", MacroRegion::Kanto),
    pref(10, "群馬県", MacroRegion::Kanto),
    pref(11, "埼玉県", MacroRegion::Kanto),
    pref(12, "千葉県", MacroRegion::Kanto),
    pref(13, "東京都", MacroRegion::Kanto),
    pref(14, "神奈川県", MacroRegion::Kanto),
    pref(15, "新潟県", MacroRegion::Chubu),
    pref(16, "富山県", MacroRegion::Chubu),
    pref(17, "石川県", MacroRegion::Chubu),
    pref(18, "福井県", MacroRegion::Chubu),
    pref(19, "山梨県", MacroRegion::Chubu),
    pref(20, "長野県", MacroRegion::Chubu),
    pref(21, "岐阜県", MacroRegion::Chubu),
    pref(22, "静岡県", MacroRegion::Chubu),
    pref(23, "愛知県", MacroRegion::Chubu),
    pref(24, "三重県", MacroRegion::Kinki),
    pref(25, "滋賀県", MacroRegion::Kinki),
    pref(26, "京都府", MacroRegion::Kinki),
    pref(27, "大阪府", MacroRegion::Kinki),
    pref(28, "兵庫県", MacroRegion::Kinki),
    pref(29, "奈良県", MacroRegion::Kinki),
    pref(30, "和歌山県", MacroRegion::Kinki),
    pref(31, "鳥取県", MacroRegion::Chugoku),
    pref(32, "島根県", MacroRegion::Chugoku),
    pref(33, "岡山県", MacroRegion::Chugoku),
    pref(34, "広島県", MacroRegion::Chugoku),
    pref(35, "山口県", MacroRegion::Chugoku),
    pref(36, "徳島県", MacroRegion::Shikoku),
    pref(37, "香川県", MacroRegion::Shikoku),
    pref(38, "愛媛県", MacroRegion::Shikoku),
    pref(39, "高知県", MacroRegion::Shikoku),
    pref(40, "福岡県", MacroRegion::Kyushu),
    pref(41, "佐賀県", MacroRegion::Kyushu),
    pref(42, "長崎県", MacroRegion::Kyushu),
    pref(43, "熊本県", MacroRegion::Kyushu),
    pref(44, "大分県", MacroRegion::Kyushu),
    pref(45, "宮崎県", MacroRegion::Kyushu),
    pref(46, "鹿児島県", MacroRegion::Kyushu),
    pref(47, "沖縄県", MacroRegion::Kyushu),
];

/// Looks up a prefecture by code.
///
/// Returns `None` for codes outside 1-47.
#[must_use]
pub fn by_code(code: u8) -> Option<&'static Prefecture> {
    let index = usize::from(code).checked_sub(1)?;
    PREFECTURES.get(index)
}

/// Japanese name of a prefecture code.
#[must_use]
pub fn prefecture_name(code: u8) -> Option<&'static str> {
    by_code(code).map(|p| p.name)
}

/// Macro-region of a prefecture code.
#[must_use]
pub fn macro_region(code: u8) -> Option<MacroRegion> {
    by_code(code).map(|p| p.region)
}

/// Codes of every prefecture in `region`, in code order.
#[must_use]
pub fn prefectures_in(region: MacroRegion) -> Vec<u8> {
    PREFECTURES
        .iter()
        .filter(|p| p.region == region)
        .map(|p| p.code)
        .collect()
}

/// Resolves a prefecture name to its code.
///
/// Accepts the full name (`東京都`) or the name without its 都/府/県 suffix
/// (`東京`). `北海道` is only accepted in full.
#[must_use]
pub fn code_for_name(name: &str) -> Option<u8> {
    let name = name.trim();
    PREFECTURES
        .iter()
        .find(|p| {
            p.name == name
                || (p.code != 1
                    && p.name
                        .strip_suffix(['都', '府', '県'])
                        .is_some_and(|short| short == name))
        })
        .map(|p| p.code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_contiguous() {
        for (i, p) in PREFECTURES.iter().enumerate() {
            assert_eq!(usize::from(p.code), i + 1, "out of order at {}", p.name);
        }
    }

    #[test]
    fn lookups() {
        assert_eq!(prefecture_name(13), Some("東京都"));
        assert_eq!(macro_region(47), Some(MacroRegion::Kyushu));
        assert_eq!(prefecture_name(0), None);
        assert_eq!(prefecture_name(48), None);
    }

    #[test]
    fn every_region_has_prefectures() {
        let total: usize = MacroRegion::all()
            .iter()
            .map(|r| prefectures_in(*r).len())
            .sum();
        assert_eq!(total, 47);
        assert_eq!(prefectures_in(MacroRegion::Hokkaido), [1]);
        assert_eq!(prefectures_in(MacroRegion::Shikoku), [36, 37, 38, 39]);
    }

    #[test]
    fn name_round_trip() {
        for p in &PREFECTURES {
            assert_eq!(code_for_name(p.name), Some(p.code), "{}", p.name);
        }
        assert_eq!(code_for_name("大阪"), Some(27));
        assert_eq!(code_for_name("北海"), None);
        assert_eq!(code_for_name("unknown"), None);
    }
}
