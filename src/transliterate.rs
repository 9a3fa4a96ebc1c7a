use serde::{Deserialize, Serialize};

/// Script-to-script rendering attached to a target language.
///
/// Only ever applied to the secondary (phonetic) line under a translation.
/// The transforms are direction-specific and not inverses of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transliteration {
    /// Ukrainian Cyrillic to Czech-style Latin.
    CyrillicToLatin,
    /// Czech Latin to Ukrainian Cyrillic.
    LatinToCyrillic,
}

impl Transliteration {
    pub fn apply(self, text: &str) -> String {
        match self {
            Self::CyrillicToLatin => cyrillic_to_latin(text),
            Self::LatinToCyrillic => latin_to_cyrillic(text),
        }
    }
}

/// Identity for languages without a registered transform.
pub fn transliterate(kind: Option<Transliteration>, text: &str) -> String {
    match kind {
        Some(kind) => kind.apply(text),
        None => text.to_string(),
    }
}

fn cyrillic_letter(c: char) -> Option<&'static str> {
    let latin = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "h",
        'ґ' => "g",
        'д' => "d",
        'е' => "e",
        'є' => "je",
        'ж' => "ž",
        'з' => "z",
        'и' => "y",
        'і' => "i",
        'ї' => "ji",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "ch",
        'ц' => "c",
        'ч' => "č",
        'ш' => "š",
        'щ' => "šč",
        'ь' => "ʼ",
        'ю' => "ju",
        'я' => "ja",
        '\'' | 'ʼ' | '’' => "",
        _ => return None,
    };
    Some(latin)
}

fn cyrillic_to_latin(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let lower = c.to_lowercase().next().unwrap_or(c);
        match cyrillic_letter(lower) {
            Some(latin) if lower != c => push_capitalized(&mut out, latin),
            Some(latin) => out.push_str(latin),
            None => out.push(c),
        }
    }
    out
}

fn latin_digraph(pair: &str) -> Option<&'static str> {
    let cyrillic = match pair {
        "ch" => "х",
        "ja" => "я",
        "je" => "є",
        "ji" => "ї",
        "ju" => "ю",
        "šč" => "щ",
        _ => return None,
    };
    Some(cyrillic)
}

fn latin_letter(c: char) -> Option<&'static str> {
    let cyrillic = match c {
        'a' | 'á' => "а",
        'b' => "б",
        'c' => "ц",
        'č' => "ч",
        'd' => "д",
        'ď' => "дь",
        'e' | 'é' => "е",
        'ě' => "є",
        'f' => "ф",
        'g' => "ґ",
        'h' => "г",
        'i' | 'í' => "і",
        'j' => "й",
        'k' | 'q' => "к",
        'l' => "л",
        'm' => "м",
        'n' => "н",
        'ň' => "нь",
        'o' | 'ó' => "о",
        'p' => "п",
        'r' => "р",
        'ř' => "рж",
        's' => "с",
        'š' => "ш",
        't' => "т",
        'ť' => "ть",
        'u' | 'ú' | 'ů' => "у",
        'v' | 'w' => "в",
        'x' => "кс",
        'y' | 'ý' => "и",
        'z' => "з",
        'ž' => "ж",
        _ => return None,
    };
    Some(cyrillic)
}

fn latin_to_cyrillic(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() * 2);
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let upper = c.is_uppercase();

        if let Some(&next) = chars.get(i + 1) {
            let pair: String = c.to_lowercase().chain(next.to_lowercase()).collect();
            if let Some(cyrillic) = latin_digraph(&pair) {
                push_cased(&mut out, cyrillic, upper);
                i += 2;
                continue;
            }
        }

        let lower = c.to_lowercase().next().unwrap_or(c);
        match latin_letter(lower) {
            Some(cyrillic) => push_cased(&mut out, cyrillic, upper),
            None => out.push(c),
        }
        i += 1;
    }
    out
}

fn push_cased(out: &mut String, s: &str, upper: bool) {
    if upper {
        push_capitalized(out, s);
    } else {
        out.push_str(s);
    }
}

// Multi-letter outputs only capitalize their first letter ("Щ" -> "Šč").
fn push_capitalized(out: &mut String, s: &str) {
    let mut chars = s.chars();
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
        out.push_str(chars.as_str());
    }
}
