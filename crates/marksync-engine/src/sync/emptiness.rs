use marksync_model::ResolvedPos;

/// True when the position sits inside a textblock with no inline content
pub fn is_empty_textblock(rpos: &ResolvedPos<'_>) -> bool {
    let parent = rpos.parent();
    parent.is_textblock() && parent.content_size() == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::editor_schema;
    use marksync_model::{Attrs, Fragment, MarkSet};
    use rstest::rstest;

    #[rstest]
    // Between blocks
    #[case(0, false)]
    // Inside "ab"
    #[case(1, false)]
    #[case(3, false)]
    // Inside the empty paragraph
    #[case(5, true)]
    fn test_is_empty_textblock(#[case] pos: usize, #[case] expected: bool) {
        let schema = editor_schema().unwrap();
        let doc = schema
            .node(
                "doc",
                Attrs::new(),
                Fragment::from_vec(vec![
                    schema
                        .node(
                            "paragraph",
                            Attrs::new(),
                            Fragment::from_node(schema.text("ab", MarkSet::empty())),
                        )
                        .unwrap(),
                    schema.empty_textblock(),
                ]),
            )
            .unwrap();

        assert_eq!(is_empty_textblock(&doc.resolve(pos).unwrap()), expected);
    }
}
