use std::cell::RefCell;

use super::*;

struct Canned {
    words: Vec<AlignedWord>,
    seen: RefCell<Option<String>>,
}

impl ForcedAligner for Canned {
    fn align(&self, _audio: &Path, transcript: &str) -> KaraokeResult<Vec<AlignedWord>> {
        *self.seen.borrow_mut() = Some(transcript.to_owned());
        Ok(self.words.clone())
    }
}

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "karaoke_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn parses_word_array() {
    let json = br#"[{"word": "Hello", "start": 0.5}, {"word": "world", "start": 1.25}]"#;
    let words = parse_aligner_output(json).unwrap();
    assert_eq!(
        words,
        vec![
            AlignedWord {
                word: "Hello".to_owned(),
                start: 0.5
            },
            AlignedWord {
                word: "world".to_owned(),
                start: 1.25
            },
        ]
    );
}

#[test]
fn rejects_malformed_output() {
    assert!(parse_aligner_output(b"{}").is_err());
    assert!(parse_aligner_output(br#"[{"word": "x"}]"#).is_err());
    assert!(parse_aligner_output(br#"[{"word": "x", "start": -2.0}]"#).is_err());
}

#[test]
fn generate_lrc_writes_lowercased_timed_words() {
    let dir = temp_dir("align_generate");
    std::fs::create_dir_all(&dir).unwrap();
    let transcript = dir.join("lyrics.txt");
    std::fs::write(&transcript, "Hello World").unwrap();
    let out = dir.join("out").join("song.lrc");

    let aligner = Canned {
        words: vec![
            AlignedWord {
                word: "Hello".to_owned(),
                start: 0.99,
            },
            AlignedWord {
                word: "World".to_owned(),
                start: 61.5,
            },
        ],
        seen: RefCell::new(None),
    };
    let n = generate_lrc(&aligner, Path::new("song.mp3"), &transcript, &out).unwrap();
    assert_eq!(n, 2);
    assert_eq!(aligner.seen.borrow().as_deref(), Some("Hello World"));
    assert_eq!(
        std::fs::read_to_string(&out).unwrap(),
        "[00:00.99]hello\n[01:01.50]world\n"
    );

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn external_aligner_requires_audio_file() {
    let aligner = ExternalAligner::new("true");
    let err = aligner
        .align(Path::new("/no/such/audio.wav"), "la la")
        .unwrap_err();
    assert!(err.to_string().contains("does not exist"));
}

#[cfg(unix)]
#[test]
fn external_aligner_runs_command_and_parses_stdout() {
    let dir = temp_dir("align_external");
    std::fs::create_dir_all(&dir).unwrap();
    let audio = dir.join("a.wav");
    std::fs::write(&audio, b"RIFF").unwrap();

    let aligner = ExternalAligner::new("sh").with_args([
        "-c",
        r#"test -f "$1" && test -f "$2" && echo '[{"word":"la","start":1.0}]'"#,
        "aligner",
    ]);
    let words = aligner.align(&audio, "la").unwrap();
    assert_eq!(words.len(), 1);
    assert_eq!(words[0].word, "la");

    let failing = ExternalAligner::new("sh").with_args(["-c", "echo boom >&2; exit 3", "aligner"]);
    let err = failing.align(&audio, "la").unwrap_err();
    assert!(err.to_string().contains("boom"));

    std::fs::remove_dir_all(&dir).ok();
}
