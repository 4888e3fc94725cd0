//! Shared text helpers. Everything the extractor matches against goes through
//! [`normalize`] first, so vocabulary surface forms must be stored normalized too.

/// Lower-case, fold accents, unify apostrophes and collapse whitespace.
/// Newlines are kept (one per run) since they delimit messages.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = true;

    for c in text.chars().flat_map(char::to_lowercase) {
        // Line breaks separate messages and must survive as clause boundaries.
        if c == '\n' {
            if out.ends_with(' ') {
                out.pop();
            }
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            last_was_space = true;
            continue;
        }
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
            continue;
        }
        last_was_space = false;
        match fold_char(c) {
            Fold::One(f) => out.push(f),
            Fold::Two(a, b) => {
                out.push(a);
                out.push(b);
            }
        }
    }

    while out.ends_with(' ') || out.ends_with('\n') {
        out.pop();
    }
    out
}

enum Fold {
    One(char),
    Two(char, char),
}

// Latin-1 + Latin Extended-A coverage is enough for French/English patient text.
fn fold_char(c: char) -> Fold {
    let f = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => 'e',
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' => 'i',
        'ñ' | 'ń' | 'ň' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' => 'o',
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' => 'u',
        'ý' | 'ÿ' => 'y',
        'ś' | 'š' => 's',
        'ź' | 'ż' | 'ž' => 'z',
        'œ' => return Fold::Two('o', 'e'),
        'æ' => return Fold::Two('a', 'e'),
        'ß' => return Fold::Two('s', 's'),
        '\u{2019}' | '\u{2018}' | '\u{02bc}' | '`' => '\'',
        '\u{2013}' | '\u{2014}' => '-',
        '\u{00b0}' | '\u{00ba}' => '°',
        other => other,
    };
    Fold::One(f)
}

/// Byte offset where the clause containing `pos` starts.
/// Clauses are delimited by sentence punctuation, commas and the conjunction "mais"/"but".
pub fn clause_start(text: &str, pos: usize) -> usize {
    let head = &text[..pos];
    let punct = head
        .rfind(|c: char| matches!(c, '.' | ',' | ';' | '!' | '?' | ':' | '\n'))
        .map(|i| i + 1)
        .unwrap_or(0);
    let conj = [" mais ", " but "]
        .iter()
        .filter_map(|w| head.rfind(w).map(|i| i + w.len()))
        .max()
        .unwrap_or(0);
    punct.max(conj)
}

/// Word tokens of a normalized fragment. Apostrophes split elisions ("d'autre" -> "d", "autre").
pub fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
}

/// Tokens that tie a cue to what follows it ("pas de", "pas d'", "no sign of").
const NEGATION_LINKS: &[&str] = &["de", "d", "du", "des", "eu", "of", "any"];

/// Tokens that turn a cue into an intensifier ("pas mal" = quite a lot).
const INTENSIFIERS: &[&str] = &["mal"];

/// True when a negation cue governs the hit at `pos`.
///
/// Only the `window` tokens right before `pos`, in the same clause, are checked. A cue counts
/// when it sits directly before the hit or is followed by a partitive link; "pas mal" never negates.
pub fn is_negated(text: &str, pos: usize, cues: &[String], window: usize) -> bool {
    let start = clause_start(text, pos);
    let before: Vec<&str> = tokens(&text[start..pos]).collect();
    let from = before.len().saturating_sub(window);

    (from..before.len()).any(|i| {
        if !cues.iter().any(|c| c == before[i]) {
            return false;
        }
        match before.get(i + 1) {
            None => true,
            Some(next) if INTENSIFIERS.contains(next) => false,
            Some(next) => NEGATION_LINKS.contains(next),
        }
    })
}
