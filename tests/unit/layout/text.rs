use super::*;

fn portrait() -> Canvas {
    Canvas {
        width: 720,
        height: 1280,
    }
}

#[test]
fn canvas_box_matches_reference_geometry() {
    let b = LayoutBox::for_canvas(portrait());
    assert_eq!(margin_px(720), 57);
    assert_eq!(b.max_width_px, 606.0);
    assert_eq!(b.max_height_px, 1280.0);
    assert_eq!(b.initial_font_px, 55);

    // Narrow canvases start at the 28px floor.
    let small = LayoutBox::for_canvas(Canvas {
        width: 256,
        height: 256,
    });
    assert_eq!(small.initial_font_px, 28);
    assert_eq!(LayoutBox::new(1300.0, 100.0).initial_font_px, 100);
}

#[test]
fn short_text_keeps_initial_size_on_one_line() {
    let mut m = FixedAdvanceMeasure::default();
    let out = layout_text("Hello", &LayoutBox::for_canvas(portrait()), &mut m);
    assert_eq!(out.font_size_px, 55);
    assert_eq!(out.lines, vec!["Hello".to_string()]);
    assert!((out.block_height_px() - 68.75).abs() < 1e-9);
}

#[test]
fn single_long_word_is_never_split() {
    let mut m = FixedAdvanceMeasure::default();
    let word = "Supercalifragilisticexpialidocious";
    let out = layout_text(word, &LayoutBox::for_canvas(portrait()), &mut m);
    assert_eq!(out.lines, vec![word.to_string()]);
    assert!(m.measure(word, out.font_size_px) > 606.0);
}

#[test]
fn shrinks_in_steps_of_two_until_block_fits() {
    let mut m = FixedAdvanceMeasure::default();
    let bbox = LayoutBox {
        max_width_px: 100.0,
        max_height_px: 100.0,
        initial_font_px: 30,
    };
    let out = layout_text("aa aa aa aa", &bbox, &mut m);
    // 30px and 28px both wrap to two lines that are not strictly below 70px.
    assert_eq!(out.font_size_px, 26);
    assert_eq!(out.lines, vec!["aa aa".to_string(), "aa aa".to_string()]);
}

#[test]
fn overflow_is_accepted_at_the_floor() {
    let mut m = FixedAdvanceMeasure::default();
    let text = "lorem ipsum ".repeat(200);
    let even = LayoutBox {
        max_width_px: 200.0,
        max_height_px: 200.0,
        initial_font_px: 40,
    };
    let out = layout_text(&text, &even, &mut m);
    assert_eq!(out.font_size_px, MIN_FONT_PX);
    assert!(out.block_height_px() >= FILL_RATIO * 200.0);

    let odd = LayoutBox {
        initial_font_px: 41,
        ..even
    };
    assert_eq!(layout_text(&text, &odd, &mut m).font_size_px, 19);
}

#[test]
fn font_size_stays_within_search_bounds() {
    let mut m = FixedAdvanceMeasure::default();
    let long = "word ".repeat(500);
    let texts: [&str; 5] = [
        "",
        "x",
        "Welcome to Video Generator",
        "Type text, pick colors, export WebM",
        long.as_str(),
    ];
    for w in [256u32, 480, 720, 1080, 1920] {
        for h in [256u32, 720, 1280, 1920] {
            let bbox = LayoutBox::for_canvas(Canvas {
                width: w,
                height: h,
            });
            for t in texts {
                let out = layout_text(t, &bbox, &mut m);
                assert!(out.font_size_px >= MIN_FONT_PX);
                assert!(out.font_size_px <= bbox.initial_font_px);
            }
        }
    }
}

#[test]
fn layout_is_deterministic() {
    let mut m = FixedAdvanceMeasure { advance_em: 0.55 };
    let bbox = LayoutBox::for_canvas(portrait());
    let text = "Type text, pick colors, export WebM and keep typing until it wraps a few times";
    let a = layout_text(text, &bbox, &mut m);
    let b = layout_text(text, &bbox, &mut m);
    assert_eq!(a, b);
}

#[test]
fn whitespace_only_text_has_no_lines() {
    let mut m = FixedAdvanceMeasure::default();
    let bbox = LayoutBox::for_canvas(portrait());
    assert!(layout_text("", &bbox, &mut m).lines.is_empty());
    let out = layout_text(" \n\t ", &bbox, &mut m);
    assert!(out.lines.is_empty());
    assert_eq!(out.font_size_px, 55);
}

#[test]
fn wrap_collapses_runs_of_whitespace() {
    let mut m = FixedAdvanceMeasure::default();
    let words: Vec<&str> = "  one\n two\tthree  ".split_whitespace().collect();
    let lines = wrap_words(&words, 10, 1000.0, &mut m);
    assert_eq!(lines, vec!["one two three".to_string()]);
}

#[test]
fn wrap_breaks_before_the_word_that_overflows() {
    let mut m = FixedAdvanceMeasure { advance_em: 1.0 };
    // 10px per char: "ab cd" = 50px fits, "ab cd ef" = 80px does not.
    let lines = wrap_words(&["ab", "cd", "ef"], 10, 60.0, &mut m);
    assert_eq!(lines, vec!["ab cd".to_string(), "ef".to_string()]);
}
