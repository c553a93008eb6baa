//! FFI notebook API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose notebook sessions to Dart via FRB as flat, sync calls.
//! - Flatten core view models into FFI-friendly records.
//!
//! # Invariants
//! - Exported functions never panic across the FFI boundary; failures come
//!   back as `ok = false` envelopes with a message.
//! - Ids cross the boundary as UTF-8 strings.
//! - One session per open document id, kept until `notebook_close`.

use log::warn;
use modelbook_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CellAction, CellId, CellView, CoreConfig, DocRepo, DocumentId, EntityId, JudgmentEdit, JudgmentView,
    ModelJudgment, ModelSession, ModifierKey, MorphismEdit, NotebookModel, NotebookView,
    ObjectEdit, RefView, SqliteDocumentRepository, TheoryCatalog, TheoryId, TypeRef, TypeView,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

const DB_FILE_NAME: &str = "modelbook.sqlite3";
static RUNTIME: OnceLock<Result<Runtime, String>> = OnceLock::new();

struct Runtime {
    docs: DocRepo<SqliteDocumentRepository>,
    catalog: Arc<TheoryCatalog>,
    modifier: ModifierKey,
    sessions: Mutex<BTreeMap<DocumentId, ModelSession>>,
}

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Core crate version.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// # FFI contract
/// - `level`: `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory for rolling log files.
/// - Idempotent for the same arguments; returns an empty string on success
///   and the error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Theory offered by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TheoryItem {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

/// Persisted notebook listing row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookSummaryItem {
    pub doc_id: String,
    pub name: String,
    pub theory: Option<String>,
    pub version: u64,
    pub updated_at: i64,
}

/// Weak reference to an object (`unset | resolved | dangling`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefItem {
    pub state: String,
    pub entity_id: Option<String>,
    pub name: Option<String>,
}

/// One rendered cell.
///
/// `kind` is `rich-text | object | morphism | unrecognized`; the remaining
/// fields are filled as the kind requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellItem {
    pub cell_id: String,
    pub kind: String,
    pub is_active: bool,
    pub text: Option<String>,
    pub entity_id: Option<String>,
    pub name: Option<String>,
    pub type_id: Option<String>,
    /// `None` when the active theory does not declare `type_id`.
    pub type_name: Option<String>,
    pub dom: Option<RefItem>,
    pub cod: Option<RefItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookItem {
    pub doc_id: String,
    pub version: u64,
    pub name: String,
    pub theory: Option<String>,
    pub theory_name: Option<String>,
    pub active_cell_id: Option<String>,
    pub cells: Vec<CellItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertOptionItem {
    pub index: u32,
    pub name: String,
    pub description: Option<String>,
    /// Key chord joined with `+`, e.g. `Alt+T`.
    pub shortcut: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticItem {
    pub entity_id: String,
    pub message: String,
}

/// Envelope for calls returning a rendered notebook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookResponse {
    pub ok: bool,
    pub notebook: Option<NotebookItem>,
    pub message: String,
}

impl NotebookResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            notebook: None,
            message: message.into(),
        }
    }
}

/// Envelope for mutating calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Cell created or affected, when there is one.
    pub cell_id: Option<String>,
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, cell_id: Option<String>) -> Self {
        Self {
            ok: true,
            cell_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            cell_id: None,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookListResponse {
    pub ok: bool,
    pub items: Vec<NotebookSummaryItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertOptionsResponse {
    pub ok: bool,
    pub items: Vec<InsertOptionItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticsResponse {
    pub ok: bool,
    pub items: Vec<DiagnosticItem>,
    pub message: String,
}

/// Theories of the configured catalog, in catalog order.
#[flutter_rust_bridge::frb(sync)]
pub fn list_theories() -> Vec<TheoryItem> {
    match runtime() {
        Ok(runtime) => runtime
            .catalog
            .theories()
            .map(|theory| TheoryItem {
                id: theory.id.to_string(),
                name: theory.name.clone(),
                description: theory.description.clone(),
            })
            .collect(),
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error call=list_theories error={err}");
            Vec::new()
        }
    }
}

/// Persisted notebooks, most recently updated first.
#[flutter_rust_bridge::frb(sync)]
pub fn notebook_list() -> NotebookListResponse {
    let listed = runtime().and_then(|runtime| runtime.docs.list().map_err(|err| err.to_string()));
    match listed {
        Ok(rows) => NotebookListResponse {
            ok: true,
            message: format!("Found {} notebook(s).", rows.len()),
            items: rows
                .into_iter()
                .map(|row| NotebookSummaryItem {
                    doc_id: row.id.to_string(),
                    name: row.name,
                    theory: row.theory.map(|theory| theory.to_string()),
                    version: row.version,
                    updated_at: row.updated_at,
                })
                .collect(),
        },
        Err(err) => NotebookListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("notebook_list failed: {err}"),
        },
    }
}

/// Creates a notebook, opens a session on it and renders it.
#[flutter_rust_bridge::frb(sync)]
pub fn notebook_create(name: String, theory: Option<String>) -> NotebookResponse {
    let result = runtime().and_then(|runtime| {
        let theory = normalize_theory(theory);
        if let Some(id) = &theory {
            if runtime.catalog.get(id).is_none() {
                return Err(format!("unknown theory: {id}"));
            }
        }
        let init = NotebookModel::new(name.trim()).with_theory(theory);
        let handle = runtime.docs.create(init).map_err(|err| err.to_string())?;
        let session = ModelSession::new(handle, Arc::clone(&runtime.catalog), runtime.modifier);
        let view = session.render();
        runtime.sessions.lock().insert(session.id(), session);
        Ok(view)
    });
    notebook_response("notebook_create", result)
}

/// Opens a session on a persisted notebook (or reuses the open one).
#[flutter_rust_bridge::frb(sync)]
pub fn notebook_open(doc_id: String) -> NotebookResponse {
    notebook_response("notebook_open", with_session(&doc_id, |session| Ok(session.render())))
}

/// Ends the session for `doc_id`. Later calls reopen it from storage.
#[flutter_rust_bridge::frb(sync)]
pub fn notebook_close(doc_id: String) -> ActionResponse {
    let result = runtime().and_then(|runtime| {
        let id = parse_doc_id(&doc_id)?;
        let had_session = runtime.sessions.lock().remove(&id).is_some();
        runtime.docs.close(id);
        Ok(had_session)
    });
    match result {
        Ok(true) => ActionResponse::success("Notebook closed.", None),
        Ok(false) => ActionResponse::success("Notebook was not open.", None),
        Err(err) => ActionResponse::failure(format!("notebook_close failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn notebook_render(doc_id: String) -> NotebookResponse {
    notebook_response("notebook_render", with_session(&doc_id, |session| Ok(session.render())))
}

#[flutter_rust_bridge::frb(sync)]
pub fn notebook_set_name(doc_id: String, name: String) -> ActionResponse {
    action_response(
        "notebook_set_name",
        with_session(&doc_id, |session| {
            session.set_name(name.trim());
            Ok(None)
        }),
    )
}

/// Selects a theory (`None` or blank clears it).
#[flutter_rust_bridge::frb(sync)]
pub fn notebook_set_theory(doc_id: String, theory: Option<String>) -> ActionResponse {
    action_response(
        "notebook_set_theory",
        with_session(&doc_id, |session| {
            session
                .set_theory(normalize_theory(theory))
                .map_err(|err| err.to_string())?;
            Ok(None)
        }),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn notebook_insert_options(doc_id: String) -> InsertOptionsResponse {
    let result = with_session(&doc_id, |session| Ok(session.insert_options()));
    match result {
        Ok(options) => InsertOptionsResponse {
            ok: true,
            message: format!("{} option(s).", options.len()),
            items: options
                .into_iter()
                .map(|option| InsertOptionItem {
                    index: u32::try_from(option.index).unwrap_or(u32::MAX),
                    name: option.name,
                    description: option.description,
                    shortcut: option.shortcut.map(|shortcut| shortcut.to_string()),
                })
                .collect(),
        },
        Err(err) => InsertOptionsResponse {
            ok: false,
            items: Vec::new(),
            message: format!("notebook_insert_options failed: {err}"),
        },
    }
}

/// Inserts a cell built from insert option `option` at `position`
/// (appended when `None`).
#[flutter_rust_bridge::frb(sync)]
pub fn notebook_insert_cell(doc_id: String, option: u32, position: Option<u32>) -> ActionResponse {
    action_response(
        "notebook_insert_cell",
        with_session(&doc_id, |session| {
            let id = session
                .insert_cell(option as usize, position.map(|position| position as usize))
                .map_err(|err| err.to_string())?;
            Ok(Some(id))
        }),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn notebook_delete_cell(doc_id: String, cell_id: String) -> ActionResponse {
    action_response(
        "notebook_delete_cell",
        with_session(&doc_id, |session| {
            let id = parse_cell_id(&cell_id)?;
            if !session.delete_cell(id) {
                return Err(format!("cell not found: {id}"));
            }
            Ok(Some(id))
        }),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn notebook_move_cell(doc_id: String, cell_id: String, index: u32) -> ActionResponse {
    action_response(
        "notebook_move_cell",
        with_session(&doc_id, |session| {
            let id = parse_cell_id(&cell_id)?;
            if !session.move_cell(id, index as usize) {
                return Err(format!("cell not found: {id}"));
            }
            Ok(Some(id))
        }),
    )
}

/// Applies a structural action relative to a cell.
///
/// `action`: `activate_above | activate_below | delete_backward |
/// delete_forward | create_below | move_up | move_down`. Returns the cell
/// that is active afterwards.
#[flutter_rust_bridge::frb(sync)]
pub fn notebook_cell_action(doc_id: String, cell_id: String, action: String) -> ActionResponse {
    action_response(
        "notebook_cell_action",
        with_session(&doc_id, |session| {
            let id = parse_cell_id(&cell_id)?;
            let action = parse_action(&action)?;
            session.apply_action(id, action);
            Ok(session.active())
        }),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn notebook_edit_text(doc_id: String, cell_id: String, content: String) -> ActionResponse {
    action_response(
        "notebook_edit_text",
        with_session(&doc_id, |session| {
            let id = parse_cell_id(&cell_id)?;
            session
                .edit_rich_text(id, content)
                .map_err(|err| err.to_string())?;
            Ok(Some(id))
        }),
    )
}

/// Edits one field of a formal cell.
///
/// `field`: `name | type | dom | cod | dom_name | cod_name`. `value` is the
/// new name, type id, object id, or object name; `None` clears `dom`/`cod`.
#[flutter_rust_bridge::frb(sync)]
pub fn notebook_edit_judgment(
    doc_id: String,
    cell_id: String,
    field: String,
    value: Option<String>,
) -> ActionResponse {
    action_response(
        "notebook_edit_judgment",
        with_session(&doc_id, |session| {
            let id = parse_cell_id(&cell_id)?;
            let model = session.handle().model();
            let judgment = model
                .notebook
                .cell(id)
                .and_then(|cell| cell.formal())
                .ok_or_else(|| format!("formal cell not found: {id}"))?;
            let edit = judgment_edit(judgment, field.trim(), value)?;
            session.edit_cell(id, edit).map_err(|err| err.to_string())?;
            Ok(Some(id))
        }),
    )
}

/// Advisory model issues in notebook order.
#[flutter_rust_bridge::frb(sync)]
pub fn notebook_diagnostics(doc_id: String) -> DiagnosticsResponse {
    match with_session(&doc_id, |session| Ok(session.diagnostics())) {
        Ok(issues) => DiagnosticsResponse {
            ok: true,
            message: format!("{} issue(s).", issues.len()),
            items: issues
                .iter()
                .map(|issue| DiagnosticItem {
                    entity_id: issue.subject().to_string(),
                    message: issue.to_string(),
                })
                .collect(),
        },
        Err(err) => DiagnosticsResponse {
            ok: false,
            items: Vec::new(),
            message: format!("notebook_diagnostics failed: {err}"),
        },
    }
}

fn runtime() -> Result<&'static Runtime, String> {
    RUNTIME
        .get_or_init(build_runtime)
        .as_ref()
        .map_err(Clone::clone)
}

fn build_runtime() -> Result<Runtime, String> {
    let mut config = match std::env::var("MODELBOOK_CONFIG") {
        Ok(path) if !path.trim().is_empty() => {
            CoreConfig::load(path.trim()).map_err(|err| err.to_string())?
        }
        _ => CoreConfig::default(),
    };
    if config.db_path.is_none() {
        config.db_path = Some(default_db_path());
    }

    let catalog = config.catalog().map_err(|err| err.to_string())?;
    let modifier = config.modifier().map_err(|err| err.to_string())?;
    let store = config.open_store().map_err(|err| err.to_string())?;
    Ok(Runtime {
        docs: DocRepo::new(store),
        catalog: Arc::new(catalog),
        modifier,
        sessions: Mutex::new(BTreeMap::new()),
    })
}

fn default_db_path() -> PathBuf {
    if let Ok(raw) = std::env::var("MODELBOOK_DB_PATH") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::temp_dir().join(DB_FILE_NAME)
}

/// Runs `f` on the session for `doc_id`, opening one if needed.
fn with_session<T>(
    doc_id: &str,
    f: impl FnOnce(&mut ModelSession) -> Result<T, String>,
) -> Result<T, String> {
    let runtime = runtime()?;
    let id = parse_doc_id(doc_id)?;
    let mut sessions = runtime.sessions.lock();
    if !sessions.contains_key(&id) {
        let session = ModelSession::open(
            &runtime.docs,
            id,
            Arc::clone(&runtime.catalog),
            runtime.modifier,
        )
        .map_err(|err| err.to_string())?;
        sessions.insert(id, session);
    }
    let session = sessions
        .get_mut(&id)
        .ok_or_else(|| format!("notebook not open: {id}"))?;
    f(session)
}

fn notebook_response(call: &str, result: Result<NotebookView, String>) -> NotebookResponse {
    match result {
        Ok(view) => NotebookResponse {
            ok: true,
            message: format!("{} cell(s).", view.cells.len()),
            notebook: Some(to_notebook_item(view)),
        },
        Err(err) => NotebookResponse::failure(format!("{call} failed: {err}")),
    }
}

fn action_response(call: &str, result: Result<Option<CellId>, String>) -> ActionResponse {
    match result {
        Ok(cell_id) => ActionResponse::success("Done.", cell_id.map(|id| id.to_string())),
        Err(err) => ActionResponse::failure(format!("{call} failed: {err}")),
    }
}

fn normalize_theory(theory: Option<String>) -> Option<TheoryId> {
    theory
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(TheoryId::new)
}

fn parse_doc_id(value: &str) -> Result<DocumentId, String> {
    value
        .trim()
        .parse()
        .map_err(|err| format!("invalid doc_id `{value}`: {err}"))
}

fn parse_cell_id(value: &str) -> Result<CellId, String> {
    value
        .trim()
        .parse()
        .map_err(|err| format!("invalid cell_id `{value}`: {err}"))
}

fn parse_action(value: &str) -> Result<CellAction, String> {
    match value.trim() {
        "activate_above" => Ok(CellAction::ActivateAbove),
        "activate_below" => Ok(CellAction::ActivateBelow),
        "delete_backward" => Ok(CellAction::DeleteBackward),
        "delete_forward" => Ok(CellAction::DeleteForward),
        "create_below" => Ok(CellAction::CreateBelow),
        "move_up" => Ok(CellAction::MoveUp),
        "move_down" => Ok(CellAction::MoveDown),
        other => Err(format!("unsupported cell action `{other}`")),
    }
}

fn judgment_edit(
    judgment: &ModelJudgment,
    field: &str,
    value: Option<String>,
) -> Result<JudgmentEdit, String> {
    let required = |value: Option<String>| value.ok_or_else(|| format!("`{field}` needs a value"));
    let entity = |value: Option<String>| {
        value
            .map(|raw| {
                raw.trim()
                    .parse::<EntityId>()
                    .map_err(|err| format!("invalid entity id: {err}"))
            })
            .transpose()
    };
    match judgment {
        ModelJudgment::Object(_) => match field {
            "name" => Ok(JudgmentEdit::Object(ObjectEdit::SetName(required(value)?))),
            "type" => Ok(JudgmentEdit::Object(ObjectEdit::SetObType(TypeRef::new(
                required(value)?,
            )))),
            other => Err(format!("unsupported object field `{other}`")),
        },
        ModelJudgment::Morphism(_) => {
            let edit = match field {
                "name" => MorphismEdit::SetName(required(value)?),
                "type" => MorphismEdit::SetMorType(TypeRef::new(required(value)?)),
                "dom" => MorphismEdit::SetDom(entity(value)?),
                "cod" => MorphismEdit::SetCod(entity(value)?),
                "dom_name" => MorphismEdit::SetDomByName(required(value)?),
                "cod_name" => MorphismEdit::SetCodByName(required(value)?),
                other => return Err(format!("unsupported morphism field `{other}`")),
            };
            Ok(JudgmentEdit::Morphism(edit))
        }
    }
}

fn to_notebook_item(view: NotebookView) -> NotebookItem {
    NotebookItem {
        doc_id: view.doc_id.to_string(),
        version: view.version,
        name: view.name,
        theory: view.theory.map(|theory| theory.to_string()),
        theory_name: view.theory_name,
        active_cell_id: view.active.map(|id| id.to_string()),
        cells: view.cells.into_iter().map(to_cell_item).collect(),
    }
}

fn to_cell_item(view: CellView<JudgmentView>) -> CellItem {
    let mut item = CellItem {
        cell_id: view.id().to_string(),
        kind: String::new(),
        is_active: false,
        text: None,
        entity_id: None,
        name: None,
        type_id: None,
        type_name: None,
        dom: None,
        cod: None,
    };
    match view {
        CellView::RichText {
            content, is_active, ..
        } => {
            item.kind = "rich-text".to_string();
            item.is_active = is_active;
            item.text = Some(content);
        }
        CellView::Formal {
            view, is_active, ..
        } => {
            item.is_active = is_active;
            item.entity_id = Some(view.id().to_string());
            match view {
                JudgmentView::Object(object) => {
                    item.kind = "object".to_string();
                    item.name = Some(object.name);
                    set_type(&mut item, object.ob_type);
                }
                JudgmentView::Morphism(morphism) => {
                    item.kind = "morphism".to_string();
                    item.name = Some(morphism.name);
                    set_type(&mut item, morphism.mor_type);
                    item.dom = Some(to_ref_item(morphism.dom));
                    item.cod = Some(to_ref_item(morphism.cod));
                }
            }
        }
        CellView::Unrecognized { tag, .. } => {
            item.kind = "unrecognized".to_string();
            item.text = tag;
        }
    }
    item
}

fn set_type(item: &mut CellItem, typ: TypeView) {
    item.type_id = Some(typ.id.to_string());
    item.type_name = typ.name;
}

fn to_ref_item(reference: RefView) -> RefItem {
    match reference {
        RefView::Unset => RefItem {
            state: "unset".to_string(),
            entity_id: None,
            name: None,
        },
        RefView::Resolved { id, name } => RefItem {
            state: "resolved".to_string(),
            entity_id: Some(id.to_string()),
            name: Some(name),
        },
        RefView::Dangling { id } => RefItem {
            state: "dangling".to_string(),
            entity_id: Some(id.to_string()),
            name: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, list_theories, notebook_cell_action, notebook_close,
        notebook_create, notebook_delete_cell, notebook_diagnostics, notebook_edit_judgment,
        notebook_insert_cell, notebook_insert_options, notebook_list, notebook_open,
        notebook_render, notebook_set_theory, ping,
    };

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_arguments() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn builtin_theories_are_listed() {
        let theories = list_theories();
        assert!(theories.iter().any(|theory| theory.id == "simple-olog"));
    }

    #[test]
    fn malformed_ids_fail_without_panicking() {
        let response = notebook_render("not-a-uuid".to_string());
        assert!(!response.ok);
        assert!(response.message.contains("invalid doc_id"));

        let created = notebook_create("ids".to_string(), None);
        let doc_id = created.notebook.expect("created").doc_id;
        let response = notebook_delete_cell(doc_id, "nope".to_string());
        assert!(!response.ok);
    }

    #[test]
    fn unknown_theory_is_rejected_on_create() {
        let response = notebook_create("bad".to_string(), Some("no-such-theory".to_string()));
        assert!(!response.ok);
        assert!(response.message.contains("unknown theory"));
    }

    #[test]
    fn notebook_flow_round_trips_through_storage() {
        let created = notebook_create("Family".to_string(), None);
        assert!(created.ok, "{}", created.message);
        let doc_id = created.notebook.expect("notebook").doc_id;

        assert!(notebook_set_theory(doc_id.clone(), Some("simple-olog".to_string())).ok);
        let options = notebook_insert_options(doc_id.clone());
        assert_eq!(options.items.len(), 3);
        assert!(options.items[0].shortcut.as_deref().unwrap().ends_with("+T"));

        let object = notebook_insert_cell(doc_id.clone(), 1, None);
        let object_id = object.cell_id.expect("object cell");
        let morphism = notebook_insert_cell(doc_id.clone(), 2, None);
        let morphism_id = morphism.cell_id.expect("morphism cell");

        let renamed = notebook_edit_judgment(
            doc_id.clone(),
            object_id.clone(),
            "name".to_string(),
            Some("person".to_string()),
        );
        assert!(renamed.ok, "{}", renamed.message);
        let linked = notebook_edit_judgment(
            doc_id.clone(),
            morphism_id.clone(),
            "dom_name".to_string(),
            Some("person".to_string()),
        );
        assert!(linked.ok, "{}", linked.message);

        let diagnostics = notebook_diagnostics(doc_id.clone());
        assert_eq!(diagnostics.items.len(), 1, "only the codomain is unset");

        assert!(notebook_close(doc_id.clone()).ok);
        let reopened = notebook_open(doc_id.clone());
        let notebook = reopened.notebook.expect("reopened");
        assert_eq!(notebook.theory.as_deref(), Some("simple-olog"));
        let morphism = &notebook.cells[1];
        assert_eq!(morphism.kind, "morphism");
        let dom = morphism.dom.as_ref().expect("dom");
        assert_eq!(dom.state, "resolved");
        assert_eq!(dom.name.as_deref(), Some("person"));

        let deleted = notebook_cell_action(doc_id.clone(), object_id, "delete_forward".to_string());
        assert!(deleted.ok, "{}", deleted.message);
        let rendered = notebook_render(doc_id.clone()).notebook.expect("rendered");
        assert_eq!(rendered.cells.len(), 1);
        assert_eq!(rendered.cells[0].dom.as_ref().unwrap().state, "dangling");

        assert!(notebook_list()
            .items
            .iter()
            .any(|item| item.doc_id == doc_id && item.name == "Family"));
    }
}
