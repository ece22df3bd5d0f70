use gridscope_render::text::{DeterministicTextMeasurer, TextMeasurer, TextStyle, wrap_words};
use proptest::prelude::*;

proptest! {
    #[test]
    fn wrapped_lines_keep_every_word_and_fit_unless_single(
        words in prop::collection::vec("[A-Za-z]{1,12}", 1..8),
        max_width in 20.0f64..200.0,
    ) {
        let text = words.join(" ");
        let style = TextStyle::default();
        let m = DeterministicTextMeasurer::default();
        let lines = wrap_words(&text, max_width, &style, &m);

        prop_assert_eq!(lines.join(" "), text);
        for line in &lines {
            let fits = m.measure(line, &style).width <= max_width;
            prop_assert!(fits || !line.contains(' '), "{line:?} overflows {max_width}");
        }
    }
}
