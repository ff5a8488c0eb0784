use super::*;

fn lens(lines: &[Line]) -> Vec<usize> {
    lines.iter().map(|l| l.len()).collect()
}

#[test]
fn fills_greedily() {
    let lines = justify_lines(&[100.0; 6], 330.0, 10.0);
    assert_eq!(lens(&lines), [3, 3]);
    assert_eq!(lines[0], Line { start: 0, end: 3 });
    assert_eq!(lines[1], Line { start: 3, end: 6 });
}

#[test]
fn exact_fit_stays_on_the_line() {
    let lines = justify_lines(&[100.0, 100.0], 210.0, 10.0);
    assert_eq!(lens(&lines), [2]);
}

#[test]
fn oversized_word_gets_its_own_line() {
    let lines = justify_lines(&[50.0, 500.0, 50.0, 50.0], 200.0, 10.0);
    assert_eq!(lens(&lines), [1, 1, 2]);
}

#[test]
fn oversized_first_word() {
    let lines = justify_lines(&[500.0, 50.0], 200.0, 10.0);
    assert_eq!(
        lines,
        vec![Line { start: 0, end: 1 }, Line { start: 1, end: 2 }]
    );
}

#[test]
fn oversized_word_after_text_is_isolated() {
    // Closing a non-empty line seeds the new line with the oversized word, so the next word
    // cannot join it either.
    let lines = justify_lines(&[150.0, 500.0, 20.0], 200.0, 10.0);
    assert_eq!(lens(&lines), [1, 1, 1]);
}

#[test]
fn empty_input_gives_no_lines() {
    assert!(justify_lines(&[], 100.0, 10.0).is_empty());
}

#[test]
fn lines_partition_words() {
    let widths = [30.0, 80.0, 120.0, 15.0, 300.0, 45.0, 45.0, 90.0, 10.0];
    let lines = justify_lines(&widths, 200.0, 12.0);
    let mut next = 0;
    for l in &lines {
        assert_eq!(l.start, next);
        assert!(!l.is_empty());
        next = l.end;
    }
    assert_eq!(next, widths.len());

    for l in &lines {
        if l.len() > 1 {
            let gaps = 12.0 * (l.len() - 1) as f64;
            let total: f64 = widths[l.start..l.end].iter().sum::<f64>() + gaps;
            assert!(total <= 200.0);
        }
    }
}
