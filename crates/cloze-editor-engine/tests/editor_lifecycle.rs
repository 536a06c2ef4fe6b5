//! End-to-end lifecycle tests driving the public `Editor` surface the way a
//! host UI would: key events, clicks, queued HTML insertion, and reset.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use cloze_editor_engine::editing::{Editor, Mark, Node};
use pretty_assertions::assert_eq;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn typing_and_blanking_a_sentence() {
    let now = Instant::now();
    let mut editor = Editor::from_html("<p>The capital of France is Paris.</p>");
    assert!(!editor.is_dirty());

    // Select "Paris" (content starts at offset 1) and blank it out.
    let text = editor.doc().text();
    let start = 1 + text.find("Paris").unwrap();
    editor.set_selection(start..start + 5);
    assert!(editor.handle_space(now));

    assert_eq!(editor.doc().text(), "The capital of France is  .");
    assert!(editor.is_dirty());

    // The caret sits right after the blank; typing lands after it.
    let caret = editor.caret();
    assert!(editor.handle_text_input(caret, caret, "!", now));
    assert_eq!(editor.doc().text(), "The capital of France is !.");
}

#[test]
fn enter_splits_and_reset_restores() {
    let now = Instant::now();
    let source = "<p>alpha beta</p>";
    let mut editor = Editor::from_html(source);

    // Split between the words.
    editor.set_selection(7..7);
    assert!(editor.handle_enter(now));
    assert_eq!(editor.doc().root().children().len(), 2);
    assert!(editor.is_dirty());

    let seen = record_changes(&mut editor);
    editor.reset();
    assert!(!editor.is_dirty());
    assert_eq!(editor.doc().text(), "alpha beta");
    assert_eq!(*seen.borrow(), vec![false]);
}

#[test]
fn queued_html_insertion_coalesces_and_lands_in_the_paragraph() {
    let start = Instant::now();
    let mut editor = Editor::from_html("<p>ab</p>");

    // Click just after the paragraph: an After position.
    editor.note_click(4);
    editor.queue_insert_html("<i>one</i>", start);
    editor.queue_insert_html("<b>two</b>", start + ms(40));

    // Nothing lands before the window elapses.
    editor.tick(start + ms(90));
    assert_eq!(editor.doc().text(), "ab");

    editor.tick(start + ms(140));
    assert_eq!(
        editor.doc().root(),
        &Node::doc(vec![Node::paragraph(vec![
            Node::text("ab"),
            Node::marked_text("two", vec![Mark::Strong]),
        ])])
    );
}

#[test]
fn pasted_blank_spans_round_trip_through_dirty_tracking() {
    let start = Instant::now();
    let source = r#"<p>x <span class="cloze-blank-hl"> </span> y</p>"#;
    let mut editor = Editor::from_html(source);
    assert!(!editor.is_dirty());

    // Inserting the same markup again is still a structural change.
    editor.note_click(1);
    editor.queue_insert_html(r#"<span class="cloze-blank-hl"> </span>"#, start);
    editor.tick(start + ms(100));
    assert!(editor.is_dirty());

    editor.reset();
    assert!(!editor.is_dirty());
}

#[test]
fn change_listener_tracks_the_dirty_flag_across_a_session() {
    let now = Instant::now();
    let mut editor = Editor::from_html("<p>ab</p>");
    let seen = record_changes(&mut editor);

    editor.set_selection(3..3);
    editor.handle_enter(now);
    editor.reset();

    assert_eq!(*seen.borrow(), vec![true, false]);
}

fn record_changes(editor: &mut Editor) -> Rc<RefCell<Vec<bool>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    editor.set_on_change(move |dirty| sink.borrow_mut().push(dirty));
    seen
}
