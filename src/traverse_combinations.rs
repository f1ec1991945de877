#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraverseResult {
    Skip,
    Continue,
    Break,
}

struct StateToExpand<Combined> {
    combined_previous: Combined,
    item_index: usize,
}

/// Depth-first walk over every sequence of `items` up to `depth_limit` long.
///
/// `combiner` builds the child of a node, or returns `None` to drop that
/// child without visiting it. `cb` decides whether a visited node is
/// expanded (`Continue`), left alone (`Skip`), or ends the walk (`Break`).
/// Returns `true` if the walk was ended by `Break`.
pub fn traverse_combinations<Item, Combined, Combiner, Cb>(
    items: &[Item],
    depth_limit: usize,
    initial_combined: Combined,
    combiner: Combiner,
    cb: &mut Cb,
) -> bool
where
    Combiner: Fn(&Combined, &Item) -> Option<Combined>,
    Cb: FnMut(&Combined) -> TraverseResult,
{
    match cb(&initial_combined) {
        TraverseResult::Break => return true,
        TraverseResult::Skip => return false,
        TraverseResult::Continue => {}
    }
    if items.is_empty() || depth_limit == 0 {
        return false;
    }
    let mut fringe_stack: Vec<StateToExpand<Combined>> = vec![StateToExpand {
        item_index: 0,
        combined_previous: initial_combined,
    }];

    while let Some(state_to_expand) = fringe_stack.last() {
        let combined = combiner(
            &state_to_expand.combined_previous,
            &items[state_to_expand.item_index],
        );
        let result = match &combined {
            Some(combined) => cb(combined),
            None => TraverseResult::Skip,
        };
        match (result, combined) {
            (TraverseResult::Break, _) => return true,
            (TraverseResult::Continue, Some(combined)) if fringe_stack.len() < depth_limit => {
                fringe_stack.push(StateToExpand {
                    combined_previous: combined,
                    item_index: 0,
                })
            }
            _ => increment(&mut fringe_stack, items.len()),
        }
    }
    false
}

fn increment<Combined>(fringe_stack: &mut Vec<StateToExpand<Combined>>, num_items: usize) {
    while let Some(solution_to_increment) = fringe_stack.last_mut() {
        if solution_to_increment.item_index < num_items - 1 {
            solution_to_increment.item_index += 1;
            break;
        } else {
            fringe_stack.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_debug_snapshot;

    use super::*;

    fn push_char(str: &String, char: &char) -> Option<String> {
        let mut s2 = str.clone();
        s2.push(*char);
        Some(s2)
    }

    #[test]
    fn test_base_case() {
        let mut calls = vec![];
        let broke = traverse_combinations(&['a', 'b', 'c'], 2, String::new(), push_char, &mut |str| {
            calls.push(str.to_owned());
            TraverseResult::Continue
        });

        assert!(!broke);
        assert_debug_snapshot!(calls, @r###"
        [
            "",
            "a",
            "aa",
            "ab",
            "ac",
            "b",
            "ba",
            "bb",
            "bc",
            "c",
            "ca",
            "cb",
            "cc",
        ]
        "###);
    }

    #[test]
    fn test_skip() {
        let mut calls = vec![];
        traverse_combinations(&['a', 'b', 'c'], 2, String::new(), push_char, &mut |str| {
            calls.push(str.to_owned());
            if str.starts_with('a') {
                TraverseResult::Skip
            } else {
                TraverseResult::Continue
            }
        });

        assert_debug_snapshot!(calls, @r###"
        [
            "",
            "a",
            "b",
            "ba",
            "bb",
            "bc",
            "c",
            "ca",
            "cb",
            "cc",
        ]
        "###);
    }

    #[test]
    fn test_combiner_prunes_and_break() {
        let mut calls = vec![];
        let broke = traverse_combinations(
            &['a', 'b', 'c'],
            3,
            String::new(),
            |str: &String, char: &char| {
                if str.ends_with(*char) {
                    None
                } else {
                    push_char(str, char)
                }
            },
            &mut |str| {
                calls.push(str.to_owned());
                if str == "bab" {
                    TraverseResult::Break
                } else {
                    TraverseResult::Continue
                }
            },
        );

        assert!(broke);
        assert_debug_snapshot!(calls, @r###"
        [
            "",
            "a",
            "ab",
            "aba",
            "abc",
            "ac",
            "aca",
            "acb",
            "b",
            "ba",
            "bab",
        ]
        "###);
    }

    #[test]
    fn test_depth_zero_visits_root_only() {
        let mut calls = vec![];
        traverse_combinations(&['a'], 0, String::new(), push_char, &mut |str| {
            calls.push(str.to_owned());
            TraverseResult::Continue
        });
        assert_eq!(calls, vec![String::new()]);
    }
}
