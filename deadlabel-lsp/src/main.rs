//! Deadlabel LSP Server - live unused label diagnostics for Swift.
//!
//! Provides IDE integration with:
//! - Diagnostics on file open/save, faded as unnecessary code
//! - A quick fix per diagnostic removing the label and its colon
//!
//! Syntax data is read from the `.syntax.json` sidecar next to the saved
//! file, so diagnostics follow the last save rather than unsaved edits.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result as LspResult;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};

use deadlabel_core::rule::collect::unused_label_ranges;
use deadlabel_core::rule::unused_label::{reason, DESCRIPTION};
use deadlabel_core::{
    init_structured_logging, load_config, removal_range, ByteRange, Severity, SourceFile,
    CONFIG_FILE,
};

const SOURCE: &str = "deadlabel";

/// Carried in `Diagnostic::data` so code actions need no server state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FixData {
    label: String,
    removal: Range,
}

/// UTF-16 LSP position of a byte offset.
fn lsp_position(text: &str, byte: usize) -> Option<Position> {
    let before = text.get(..byte)?;
    let line = before.matches('\n').count();
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let character = before[line_start..].encode_utf16().count();
    Some(Position {
        line: line as u32,
        character: character as u32,
    })
}

fn lsp_range(text: &str, range: ByteRange) -> Option<Range> {
    Some(Range {
        start: lsp_position(text, range.start)?,
        end: lsp_position(text, range.end)?,
    })
}

fn lsp_severity(severity: Severity) -> DiagnosticSeverity {
    match severity {
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Error => DiagnosticSeverity::ERROR,
    }
}

/// One diagnostic per unused label, in source order.
fn diagnostics_for(file: &SourceFile, severity: Severity) -> Vec<Diagnostic> {
    let text = file.contents();
    let mut labels = unused_label_ranges(file);
    labels.reverse();

    labels
        .into_iter()
        .filter_map(|label| {
            let name = text.get(label.start..label.end)?.to_string();
            let removal = removal_range(file, label)?;
            let data = FixData {
                label: name.clone(),
                removal: lsp_range(text, removal)?,
            };
            Some(Diagnostic {
                range: lsp_range(text, label)?,
                severity: Some(lsp_severity(severity)),
                code: Some(NumberOrString::String(DESCRIPTION.identifier.to_string())),
                code_description: None,
                source: Some(SOURCE.to_string()),
                message: reason(&name),
                related_information: None,
                tags: Some(vec![DiagnosticTag::UNNECESSARY]),
                data: serde_json::to_value(data).ok(),
            })
        })
        .collect()
}

/// Quick fixes for the diagnostics of `uri` that carry fix data.
fn quick_fixes(uri: &Url, diagnostics: &[Diagnostic]) -> Vec<CodeActionOrCommand> {
    diagnostics
        .iter()
        .filter(|d| {
            matches!(&d.code, Some(NumberOrString::String(code)) if code == DESCRIPTION.identifier)
        })
        .filter_map(|d| {
            let data: FixData = serde_json::from_value(d.data.clone()?).ok()?;
            let edit = TextEdit {
                range: data.removal,
                new_text: String::new(),
            };
            Some(CodeActionOrCommand::CodeAction(CodeAction {
                title: format!("Remove unused label `{}`", data.label),
                kind: Some(CodeActionKind::QUICKFIX),
                diagnostics: Some(vec![d.clone()]),
                edit: Some(WorkspaceEdit {
                    changes: Some([(uri.clone(), vec![edit])].into_iter().collect()),
                    ..WorkspaceEdit::default()
                }),
                is_preferred: Some(true),
                ..CodeAction::default()
            }))
        })
        .collect()
}

fn is_swift(uri: &Url) -> bool {
    uri.path().ends_with(".swift")
}

/// Deadlabel Language Server state.
struct DeadlabelLsp {
    client: Client,
    /// Workspace root holding `deadlabel.toml`, if the client sent one.
    workspace_root: Arc<RwLock<Option<PathBuf>>>,
}

impl DeadlabelLsp {
    fn new(client: Client) -> Self {
        Self {
            client,
            workspace_root: Arc::new(RwLock::new(None)),
        }
    }

    /// Severity from `deadlabel.toml` in the workspace root, else next to the file.
    async fn severity_for(&self, file: &Path) -> Result<Severity> {
        let root = self.workspace_root.read().await.clone();
        let dir = root
            .filter(|r| r.join(CONFIG_FILE).exists())
            .or_else(|| file.parent().map(Path::to_path_buf));
        let Some(dir) = dir else {
            return Ok(Severity::default());
        };
        match load_config(&dir)? {
            Some(cfg) => Ok(cfg.severity(&dir.join(CONFIG_FILE))?),
            None => Ok(Severity::default()),
        }
    }

    async fn compute_diagnostics(&self, path: &Path) -> Result<Vec<Diagnostic>> {
        let severity = self.severity_for(path).await?;
        let file = SourceFile::load(path)?;
        Ok(diagnostics_for(&file, severity))
    }

    /// Lint one file and publish its diagnostics.
    async fn run_analysis(&self, uri: Url) {
        let path = match uri.to_file_path() {
            Ok(p) => p,
            Err(_) => {
                self.log_error("Invalid file URI").await;
                return;
            }
        };

        match self.compute_diagnostics(&path).await {
            Ok(diagnostics) => {
                self.log_info(&format!(
                    "{}: {} unused label(s)",
                    path.display(),
                    diagnostics.len()
                ))
                .await;
                self.client.publish_diagnostics(uri, diagnostics, None).await;
            }
            Err(e) => {
                self.log_error(&format!("Analysis failed for {}: {:#}", path.display(), e))
                    .await;
                self.client.publish_diagnostics(uri, Vec::new(), None).await;
            }
        }
    }

    async fn log_info(&self, message: &str) {
        self.client.log_message(MessageType::INFO, message).await;
    }

    async fn log_error(&self, message: &str) {
        self.client.log_message(MessageType::ERROR, message).await;
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for DeadlabelLsp {
    async fn initialize(&self, params: InitializeParams) -> LspResult<InitializeResult> {
        if let Some(root_uri) = params.root_uri {
            if let Ok(path) = root_uri.to_file_path() {
                let mut root = self.workspace_root.write().await;
                *root = Some(path);
            }
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::NONE),
                        save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                            include_text: Some(false),
                        })),
                        ..Default::default()
                    },
                )),
                code_action_provider: Some(CodeActionProviderCapability::Options(
                    CodeActionOptions {
                        code_action_kinds: Some(vec![CodeActionKind::QUICKFIX]),
                        ..CodeActionOptions::default()
                    },
                )),
                ..ServerCapabilities::default()
            },
            server_info: Some(ServerInfo {
                name: "deadlabel-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.log_info("Deadlabel LSP server initialized").await;
    }

    async fn shutdown(&self) -> LspResult<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        if is_swift(&uri) {
            self.run_analysis(uri).await;
        }
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let uri = params.text_document.uri;
        if is_swift(&uri) {
            self.run_analysis(uri).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.client
            .publish_diagnostics(params.text_document.uri, vec![], None)
            .await;
    }

    async fn code_action(&self, params: CodeActionParams) -> LspResult<Option<CodeActionResponse>> {
        let actions = quick_fixes(&params.text_document.uri, &params.context.diagnostics);
        Ok(if actions.is_empty() { None } else { Some(actions) })
    }
}

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] deadlabel-lsp internal error: {}", info);
    }));

    // stdout carries the protocol; logs go to stderr
    init_structured_logging();

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(DeadlabelLsp::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
