//! Rule-based multilingual keyword matcher.
//!
//! Entries are phrases of one or more words. A word ending in `*` is a stem
//! and matches any token starting with it. At each token position the
//! longest matching phrase wins and consumes its tokens, so "very slow" is
//! not also read as "slow".

use cantus_spec::{Complexity, InstrumentId, Mood, TempoHint};

use super::{Tag, TagMatch, TagMatcher};

/// A lexicon phrase and the tag it produces.
#[derive(Debug, Clone)]
struct Entry {
    words: Vec<String>,
    tag: Tag,
}

/// Default [`TagMatcher`] backed by a static multilingual lexicon.
#[derive(Debug, Clone)]
pub struct LexiconMatcher {
    entries: Vec<Entry>,
}

impl Default for LexiconMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconMatcher {
    /// Matcher with the built-in English, Spanish, French, German, Italian
    /// and Portuguese vocabulary.
    pub fn new() -> Self {
        let mut entries = Vec::new();
        let mut add = |phrases: &[&str], tag: Tag| {
            for phrase in phrases {
                entries.push(Entry {
                    words: tokenize(phrase).into_iter().map(|(_, w)| w).collect(),
                    tag: tag.clone(),
                });
            }
        };

        // Styles
        add(&["pop"], Tag::Style("pop".into()));
        add(
            &["rock", "rocking", "rockig", "metal", "grunge", "punk"],
            Tag::Style("rock".into()),
        );
        add(&["jazz*", "bebop", "swing"], Tag::Style("jazz".into()));
        add(&["blues*"], Tag::Style("blues".into()));
        add(
            &[
                "classical",
                "clásica",
                "clásico",
                "classique",
                "klassisch*",
                "classica",
                "classico",
                "clássica",
                "clássico",
                "baroque",
                "barroco",
                "sonata",
                "concerto",
            ],
            Tag::Style("classical".into()),
        );
        add(
            &["ambient*", "ambiental", "ambiance", "atmospheric", "drone"],
            Tag::Style("ambient".into()),
        );
        add(
            &[
                "electronic*",
                "electrónic*",
                "électronique",
                "elektronisch*",
                "elettronic*",
                "eletrônic*",
                "edm",
                "techno",
                "house",
                "synthwave",
                "trance",
                "dance",
            ],
            Tag::Style("electronic".into()),
        );
        add(
            &["folk*", "folclór*", "country", "bluegrass"],
            Tag::Style("folk".into()),
        );
        add(
            &["lofi", "lo fi", "chillhop", "hip hop", "hiphop"],
            Tag::Style("lofi".into()),
        );
        add(
            &[
                "cinematic",
                "cinemat*",
                "orchestr*",
                "orquest*",
                "film",
                "filmmusik",
                "soundtrack",
                "trailer",
            ],
            Tag::Style("cinematic".into()),
        );
        add(
            &[
                "latin*", "salsa", "bossa", "samba", "tango", "reggaeton", "cumbia",
            ],
            Tag::Style("latin".into()),
        );

        // Cultural markers
        add(
            &[
                "celtic",
                "celta",
                "celtique",
                "keltisch*",
                "celtico",
                "irish",
                "irlandés",
                "irlandais*",
                "irisch*",
                "scottish",
                "gaelic",
            ],
            Tag::Culture("celtic".into()),
        );
        add(
            &[
                "japanese",
                "japan",
                "japonés",
                "japonesa",
                "japonais*",
                "japanisch*",
                "giappones*",
                "japonês",
                "japonesa",
            ],
            Tag::Culture("japanese".into()),
        );
        add(
            &["brazilian", "cuban", "mexican", "brasileñ*", "cubano", "mexicano"],
            Tag::Culture("latin".into()),
        );

        // Moods
        add(
            &[
                "happy",
                "joy*",
                "cheerful",
                "upbeat",
                "feliz",
                "alegre",
                "heureux",
                "heureuse",
                "joyeux",
                "fröhlich*",
                "glücklich*",
                "felice",
                "allegr*",
            ],
            Tag::Mood(Mood::Happy),
        );
        add(
            &[
                "sad",
                "sadness",
                "melanchol*",
                "melancól*",
                "mélancol*",
                "malincon*",
                "sorrow*",
                "grief",
                "mournful",
                "triste",
                "tristeza",
                "traurig*",
            ],
            Tag::Mood(Mood::Sad),
        );
        add(
            &[
                "calm*",
                "relax*",
                "peaceful",
                "serene",
                "meditat*",
                "tranquil*",
                "soothing",
                "chill",
                "calme",
                "paisible",
                "ruhig*",
                "entspann*",
                "sereno",
                "calmo",
                "pacífic*",
            ],
            Tag::Mood(Mood::Calm),
        );
        add(
            &[
                "energetic",
                "energy",
                "energético",
                "enérgico",
                "énergique",
                "energisch*",
                "energico",
                "driving",
                "powerful",
                "intense",
                "exciting",
            ],
            Tag::Mood(Mood::Energetic),
        );
        add(
            &[
                "dark*",
                "sinister",
                "ominous",
                "gloomy",
                "oscur*",
                "sombre",
                "sombrío",
                "dunkel*",
                "düster*",
                "scuro",
                "cupo",
                "escur*",
            ],
            Tag::Mood(Mood::Dark),
        );
        add(
            &[
                "myster*",
                "misterio*",
                "mystérieu*",
                "geheimnisvoll*",
                "eerie",
                "enigmatic",
            ],
            Tag::Mood(Mood::Mysterious),
        );
        add(
            &[
                "romantic*",
                "romántic*",
                "romantique",
                "romantisch*",
                "romantico",
                "romântic*",
                "love",
                "amor",
                "amour",
                "liebe",
            ],
            Tag::Mood(Mood::Romantic),
        );
        add(
            &[
                "epic", "épic*", "episch*", "epico", "heroic", "majestic", "grand",
            ],
            Tag::Mood(Mood::Epic),
        );
        add(
            &[
                "playful",
                "whimsical",
                "quirky",
                "juguet*",
                "ludique",
                "verspielt*",
                "giocos*",
            ],
            Tag::Mood(Mood::Playful),
        );

        // Tempo hints
        add(
            &[
                "very slow",
                "extremely slow",
                "muy lento",
                "muy lenta",
                "très lent*",
                "sehr langsam*",
                "molto lento",
                "largo",
                "grave",
            ],
            Tag::Tempo(TempoHint::VerySlow),
        );
        add(
            &[
                "slow*",
                "lento",
                "lenta",
                "lent",
                "lente",
                "langsam*",
                "adagio",
                "leisurely",
                "devagar",
            ],
            Tag::Tempo(TempoHint::Slow),
        );
        add(
            &[
                "moderate",
                "medium tempo",
                "mid tempo",
                "midtempo",
                "moderato",
                "moderado",
                "modéré",
                "andante",
                "mäßig",
            ],
            Tag::Tempo(TempoHint::Moderate),
        );
        add(
            &[
                "fast",
                "quick",
                "rápid*",
                "rapide",
                "schnell*",
                "veloce",
                "allegro",
            ],
            Tag::Tempo(TempoHint::Fast),
        );
        add(
            &[
                "very fast",
                "extremely fast",
                "muy rápido",
                "muy rápida",
                "très rapide",
                "sehr schnell*",
                "presto",
                "frenetic",
                "velocissimo",
            ],
            Tag::Tempo(TempoHint::VeryFast),
        );

        // Instruments
        add(
            &["piano*", "klavier", "grand piano", "keys"],
            Tag::Instrument(InstrumentId::Piano),
        );
        add(
            &[
                "electric piano",
                "rhodes",
                "wurlitzer",
                "e piano",
                "piano eléctrico",
                "piano électrique",
            ],
            Tag::Instrument(InstrumentId::ElectricPiano),
        );
        add(
            &["organ", "órgano", "orgue", "orgel", "organo", "hammond"],
            Tag::Instrument(InstrumentId::Organ),
        );
        add(
            &[
                "guitar*",
                "guitarra*",
                "guitare*",
                "gitarre*",
                "chitarra*",
                "acoustic guitar",
                "nylon",
            ],
            Tag::Instrument(InstrumentId::AcousticGuitar),
        );
        add(
            &[
                "electric guitar",
                "guitarra eléctrica",
                "guitare électrique",
                "e gitarre",
                "distorted guitar",
            ],
            Tag::Instrument(InstrumentId::ElectricGuitar),
        );
        add(
            &["violin*", "fiddle*", "violín", "violon", "geige*", "violino"],
            Tag::Instrument(InstrumentId::Violin),
        );
        add(
            &["cello*", "violonchelo", "violoncelle", "violoncello"],
            Tag::Instrument(InstrumentId::Cello),
        );
        add(
            &[
                "strings",
                "string section",
                "cuerdas",
                "cordes",
                "streicher",
                "archi",
            ],
            Tag::Instrument(InstrumentId::Strings),
        );
        add(
            &["harp*", "arpa", "harpe", "harfe"],
            Tag::Instrument(InstrumentId::Harp),
        );
        add(
            &[
                "flute*",
                "flauta",
                "flûte",
                "flöte",
                "flauto",
                "shakuhachi",
                "whistle",
                "tin whistle",
            ],
            Tag::Instrument(InstrumentId::Flute),
        );
        add(
            &[
                "clarinet*",
                "clarinete",
                "clarinette",
                "klarinette",
                "clarinetto",
            ],
            Tag::Instrument(InstrumentId::Clarinet),
        );
        add(&["sax*"], Tag::Instrument(InstrumentId::Saxophone));
        add(
            &[
                "trumpet*",
                "trompeta",
                "trompette",
                "trompete",
                "tromba",
                "brass",
            ],
            Tag::Instrument(InstrumentId::Trumpet),
        );
        add(
            &["choir*", "coro", "chœur", "chor", "voices", "vocal*"],
            Tag::Instrument(InstrumentId::Choir),
        );
        add(
            &[
                "synth",
                "synths",
                "synthesizer*",
                "synth lead",
                "lead synth",
                "sintetizador*",
                "synthé*",
            ],
            Tag::Instrument(InstrumentId::SynthLead),
        );
        add(
            &["synth pad", "pad", "pads"],
            Tag::Instrument(InstrumentId::SynthPad),
        );
        add(
            &[
                "double bass",
                "upright bass",
                "contrabajo",
                "contrebasse",
                "kontrabass",
                "contrabbasso",
            ],
            Tag::Instrument(InstrumentId::AcousticBass),
        );
        add(
            &[
                "bass",
                "bassline",
                "bass guitar",
                "electric bass",
                "bajo",
                "basse",
                "basso",
            ],
            Tag::Instrument(InstrumentId::ElectricBass),
        );
        add(
            &["synth bass", "sub bass", "808"],
            Tag::Instrument(InstrumentId::SynthBass),
        );
        add(
            &[
                "drum*",
                "batería",
                "batterie",
                "schlagzeug",
                "batteria",
                "bateria",
            ],
            Tag::Instrument(InstrumentId::DrumKit),
        );
        add(
            &[
                "percussion*",
                "percusión",
                "percussão",
                "schlagwerk",
                "bongo*",
                "conga*",
                "taiko",
                "bodhran",
                "tabla",
                "cajón",
                "cajon",
                "shaker*",
            ],
            Tag::Instrument(InstrumentId::HandPercussion),
        );
        add(
            &["marimba*", "xylophone", "vibraphone", "glockenspiel"],
            Tag::Instrument(InstrumentId::Marimba),
        );
        add(&["koto", "shamisen"], Tag::Instrument(InstrumentId::Koto));
        add(&["sitar*"], Tag::Instrument(InstrumentId::Sitar));

        // Complexity
        add(
            &[
                "simple",
                "minimal*",
                "basic",
                "sencill*",
                "einfach*",
                "semplice",
                "simples",
            ],
            Tag::Complexity(Complexity::Simple),
        );
        add(
            &[
                "rich",
                "lush",
                "complex*",
                "complej*",
                "komplex*",
                "compless*",
                "sophisticated",
            ],
            Tag::Complexity(Complexity::Rich),
        );
        add(
            &["intricate", "adventurous", "experimental", "avant garde"],
            Tag::Complexity(Complexity::Adventurous),
        );

        Self { entries }
    }

    /// Number of lexicon phrases.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TagMatcher for LexiconMatcher {
    fn name(&self) -> &str {
        "lexicon"
    }

    fn match_tags(&self, text: &str) -> Vec<TagMatch> {
        let tokens = tokenize(text);
        let mut matches = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            let mut best_len = 0;
            let mut best: Vec<&Tag> = Vec::new();
            for entry in &self.entries {
                let len = entry.words.len();
                if len < best_len || !phrase_matches(&entry.words, &tokens[i..]) {
                    continue;
                }
                if len > best_len {
                    best_len = len;
                    best.clear();
                }
                if !best.contains(&&entry.tag) {
                    best.push(&entry.tag);
                }
            }
            if best_len == 0 {
                i += 1;
                continue;
            }
            let offset = tokens[i].0;
            for tag in best {
                matches.push(TagMatch {
                    offset,
                    tag: tag.clone(),
                });
            }
            i += best_len;
        }
        matches
    }
}

fn phrase_matches(words: &[String], tokens: &[(usize, String)]) -> bool {
    if words.is_empty() || words.len() > tokens.len() {
        return false;
    }
    words
        .iter()
        .zip(tokens.iter())
        .all(|(word, (_, token))| word_matches(word, token))
}

fn word_matches(word: &str, token: &str) -> bool {
    match word.strip_suffix('*') {
        Some(stem) => token.starts_with(stem),
        None => word == token,
    }
}

/// Lowercase `text` and split it into alphanumeric tokens with their byte
/// offsets in `text`. A trailing `*` on a token is kept so lexicon stems
/// survive tokenization.
pub(crate) fn tokenize(text: &str) -> Vec<(usize, String)> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut start = 0;
    for (idx, ch) in text.char_indices() {
        if ch.is_alphanumeric() || (ch == '*' && !current.is_empty()) {
            if current.is_empty() {
                start = idx;
            }
            current.extend(ch.to_lowercase());
        } else if !current.is_empty() {
            tokens.push((start, std::mem::take(&mut current)));
        }
    }
    if !current.is_empty() {
        tokens.push((start, current));
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(text: &str) -> Vec<Tag> {
        LexiconMatcher::new()
            .match_tags(text)
            .into_iter()
            .map(|m| m.tag)
            .collect()
    }

    #[test]
    fn tokenize_keeps_offsets_and_unicode() {
        let tokens = tokenize("Lo-Fi, très lent");
        let words: Vec<_> = tokens.iter().map(|(_, w)| w.as_str()).collect();
        assert_eq!(words, vec!["lo", "fi", "très", "lent"]);
        assert_eq!(tokens[1].0, 3);
    }

    #[test]
    fn stems_match_inflections() {
        assert_eq!(tags("a relaxing tune"), vec![Tag::Mood(Mood::Calm)]);
        assert_eq!(tags("jazzy"), vec![Tag::Style("jazz".into())]);
    }

    #[test]
    fn longest_phrase_wins() {
        assert_eq!(tags("very slow"), vec![Tag::Tempo(TempoHint::VerySlow)]);
        assert_eq!(
            tags("electric piano"),
            vec![Tag::Instrument(InstrumentId::ElectricPiano)]
        );
        assert_eq!(
            tags("double bass"),
            vec![Tag::Instrument(InstrumentId::AcousticBass)]
        );
    }

    #[test]
    fn one_word_can_carry_two_categories() {
        let found = tags("allegro");
        assert!(found.contains(&Tag::Mood(Mood::Happy)));
        assert!(found.contains(&Tag::Tempo(TempoHint::Fast)));
    }

    #[test]
    fn multilingual_vocabulary() {
        assert_eq!(tags("música triste"), vec![Tag::Mood(Mood::Sad)]);
        assert_eq!(tags("ruhige Klaviermusik"), vec![Tag::Mood(Mood::Calm)]);
        assert_eq!(tags("chanson mélancolique"), vec![Tag::Mood(Mood::Sad)]);
        assert_eq!(
            tags("flauta celta"),
            vec![
                Tag::Instrument(InstrumentId::Flute),
                Tag::Culture("celtic".into())
            ]
        );
    }

    #[test]
    fn unknown_vocabulary_yields_nothing() {
        assert!(tags("zxqv blorp").is_empty());
    }
}
