use cobol_parser::cobol::formats::to_treeviz_str;
use lsp_types::Url;
use serde_json::Value;
use tower_lsp::jsonrpc::{Error, Result};

use crate::documents::DocumentStore;

/// Returns the tree dump of a stored document. Argument: the document uri as a string.
pub const COMMAND_SHOW_SYNTAX_TREE: &str = "cobol.showSyntaxTree";

pub const COMMANDS: &[&str] = &[COMMAND_SHOW_SYNTAX_TREE];

pub fn execute_command(
    documents: &DocumentStore,
    command: &str,
    arguments: &[Value],
) -> Result<Option<Value>> {
    match command {
        COMMAND_SHOW_SYNTAX_TREE => {
            let uri = arguments
                .first()
                .and_then(Value::as_str)
                .ok_or_else(|| Error::invalid_params("expected a document uri"))?;
            let uri = Url::parse(uri)
                .map_err(|err| Error::invalid_params(format!("invalid uri '{uri}': {err}")))?;
            let tree = documents
                .get(&uri)
                .and_then(|model| model.analysis().map(|analysis| to_treeviz_str(analysis.root())));
            Ok(tree.map(Value::String))
        }
        _ => Err(Error::invalid_request()),
    }
}
