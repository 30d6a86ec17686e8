// WHY: Books converted from print often break one logical paragraph into many <p> lines;
// joining equally-styled siblings first lets the splitter regroup by sentences

use tracing::debug;

use crate::markup::{Document, Node, ParagraphElement};

fn is_boundary_space(c: char) -> bool {
    c.is_whitespace() || c == '\u{00A0}'
}

/// Whether two paragraphs carry the same `class` and `style`
pub fn same_style(a: &ParagraphElement, b: &ParagraphElement) -> bool {
    a.normalized_class() == b.normalized_class() && a.normalized_style() == b.normalized_style()
}

/// Merge decisions computed against an immutable snapshot of the node list
///
/// Each group lists node indices of paragraphs that collapse into the first one.
fn plan_merges(nodes: &[Node]) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut last_paragraph: Option<usize> = None;

    for (index, node) in nodes.iter().enumerate() {
        let Node::Paragraph(paragraph) = node else {
            if !node.is_blank_text() {
                last_paragraph = None;
            }
            continue;
        };

        let joins_previous = last_paragraph
            .and_then(|prev| nodes[prev].as_paragraph())
            .is_some_and(|prev| prev.parent() == paragraph.parent() && same_style(prev, paragraph));

        match groups.last_mut() {
            Some(group) if joins_previous => group.push(index),
            _ => groups.push(vec![index]),
        }
        last_paragraph = Some(index);
    }

    groups.retain(|group| group.len() > 1);
    groups
}

fn append_paragraph(target: &mut ParagraphElement, next: &ParagraphElement) {
    let needs_space = !target.inner_html().ends_with(is_boundary_space)
        && !next.inner_html().starts_with(is_boundary_space);
    if needs_space {
        target.append_html(" ");
    }
    target.append_html(next.inner_html());
}

/// Merge runs of adjacent same-parent paragraphs with equal `class`/`style`, in place
///
/// Runs of any length collapse into their first paragraph, which keeps its own
/// attributes. Whitespace between merged paragraphs is dropped. Returns the number
/// of paragraphs absorbed.
pub fn merge_adjacent(document: &mut Document) -> usize {
    let snapshot = document.take_nodes();
    let groups = plan_merges(&snapshot);
    if groups.is_empty() {
        document.set_nodes(snapshot);
        return 0;
    }

    // Node index -> group it heads; members are absorbed
    let mut heads = vec![None; snapshot.len()];
    let mut absorbed = vec![false; snapshot.len()];
    for (group_index, group) in groups.iter().enumerate() {
        heads[group[0]] = Some(group_index);
        // Everything from the head up to the last member disappears except the head
        for index in group[0] + 1..=group[group.len() - 1] {
            absorbed[index] = true;
        }
    }

    let mut rewritten = Vec::with_capacity(snapshot.len());
    for (index, node) in snapshot.iter().enumerate() {
        if absorbed[index] {
            continue;
        }
        match (heads[index], node) {
            (Some(group_index), Node::Paragraph(head)) => {
                let mut merged = head.clone();
                for &member in &groups[group_index][1..] {
                    if let Some(next) = snapshot[member].as_paragraph() {
                        append_paragraph(&mut merged, next);
                    }
                }
                rewritten.push(Node::Paragraph(merged));
            }
            _ => rewritten.push(node.clone()),
        }
    }

    let merged_away: usize = groups.iter().map(|g| g.len() - 1).sum();
    debug!("Merged {} paragraphs into {} groups", merged_away, groups.len());
    document.set_nodes(rewritten);
    merged_away
}
