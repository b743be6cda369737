// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
use marksync_engine::font_size_mark;
use marksync_model::{Attrs, Fragment, MarkSet, Node, Schema};

/// A document of `blocks` paragraphs with sized text, every fifth one empty
#[allow(dead_code)]
pub fn generate_document(schema: &Schema, blocks: usize) -> Node {
    let marks = MarkSet::from_marks([font_size_mark(schema, 18).unwrap()]);
    let paragraphs = (0..blocks)
        .map(|i| {
            let content = if i % 5 == 4 {
                Fragment::empty()
            } else {
                Fragment::from_node(schema.text("Paragraph with some content.", marks.clone()))
            };
            schema.node("paragraph", Attrs::new(), content).unwrap()
        })
        .collect();
    schema
        .node("doc", Attrs::new(), Fragment::from_vec(paragraphs))
        .unwrap()
}

/// Position just after the text of the paragraph at `index`
#[allow(dead_code)]
pub fn end_of_block(doc: &Node, index: usize) -> usize {
    (0..index).map(|i| doc.child(i).node_size()).sum::<usize>() + doc.child(index).node_size() - 1
}
