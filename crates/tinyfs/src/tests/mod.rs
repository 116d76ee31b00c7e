
use crate::fs::FsState;
use crate::node::Node;
use serde_json::json;

/// The fixture tree used across tests:
///
/// ```text
/// /r
/// /r/asdf
/// /r/asdf/fdsa            (file)
/// /r/asdf/ghjk            (file)
/// /r/asdf/qwer
/// /r/asdf/qwer/zxcv
/// /r/asdf/qwer/zxcv/asdf  (file)
/// /r/asdf/zxcv
/// ```
pub(crate) fn fixture() -> FsState {
    FsState::from_entries([
        ("/r/asdf", Node::Directory),
        ("/r/asdf/fdsa", Node::file(json!(true))),
        ("/r/asdf/ghjk", Node::file(json!(true))),
        ("/r/asdf/zxcv", Node::Directory),
        ("/r/asdf/qwer", Node::Directory),
        ("/r/asdf/qwer/zxcv", Node::Directory),
        ("/r/asdf/qwer/zxcv/asdf", Node::file(json!(true))),
    ])
}

/// All paths of a state in key order
pub(crate) fn paths(state: &FsState) -> Vec<&str> {
    state.entries().map(|(p, _)| p).collect()
}
