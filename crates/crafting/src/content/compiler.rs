use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};
use tracing::info;

use crate::catalog::{Catalog, CatalogError};
use crate::elements::{Item, ItemStack, Zone};
use crate::hashing::hash_xml_inputs;
use crate::transformation::{ChangeKind, InventoryOwner, Transformation};
use crate::world::World;

use super::discovery::collect_xml_files_sorted;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentErrorCode {
    ReadFile,
    XmlMalformed,
    InvalidRoot,
    UnknownDefType,
    UnknownField,
    DuplicateField,
    MissingField,
    InvalidValue,
    DuplicateDef,
    /// The defs parsed but describe an inconsistent world or transformation.
    Configuration,
}

#[derive(Debug, Clone)]
pub struct ContentCompileError {
    pub code: ContentErrorCode,
    pub message: String,
    pub file_path: PathBuf,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for ContentCompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(
                f,
                "{:?}: {} (file={}, line={}, column={})",
                self.code,
                self.message,
                self.file_path.display(),
                loc.line,
                loc.column
            ),
            None => write!(
                f,
                "{:?}: {} (file={})",
                self.code,
                self.message,
                self.file_path.display()
            ),
        }
    }
}

impl std::error::Error for ContentCompileError {}

#[derive(Debug)]
struct PendingWorld {
    file_path: PathBuf,
    location: Option<SourceLocation>,
    items: Vec<Item>,
    zones: Vec<Zone>,
    zones_items: Vec<Item>,
    start_zone: Option<Zone>,
    start_items: Vec<ItemStack>,
    start_zones_items: Vec<(Zone, Vec<ItemStack>)>,
}

#[derive(Debug)]
struct PendingTransformation {
    def_name: String,
    file_path: PathBuf,
    location: Option<SourceLocation>,
    transformation: Transformation,
}

#[derive(Debug, Default)]
struct ParsedDefs {
    world: Option<PendingWorld>,
    transformations: Vec<PendingTransformation>,
}

/// Compiles a single defs document. `file_path` is only used for error reporting.
pub fn compile_catalog_str(raw: &str, file_path: &Path) -> Result<Catalog, ContentCompileError> {
    let mut defs = ParsedDefs::default();
    parse_defs_document(file_path, raw, &mut defs)?;
    assemble_catalog(defs, file_path)
}

pub fn compile_catalog_file(path: &Path) -> Result<Catalog, ContentCompileError> {
    let raw =
        fs::read_to_string(path).map_err(|source| read_error(path.to_path_buf(), source))?;
    let catalog = compile_catalog_str(&raw, path)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    info!(
        defs_path = %path.display(),
        xml_file_count = 1,
        transformations = catalog.len(),
        input_hash = %hash_xml_inputs([(file_name.as_str(), raw.as_str())]),
        "content_compiled"
    );
    Ok(catalog)
}

/// Compiles every `*.xml` file under `root` in sorted relative-path order, as one
/// set of defs: at most one `<WorldDef>` and unique `defName`s across files.
pub fn compile_catalog_dir(root: &Path) -> Result<Catalog, ContentCompileError> {
    let sources =
        collect_xml_files_sorted(root).map_err(|error| read_error(error.path, error.source))?;
    let mut raws = Vec::with_capacity(sources.len());
    for source in &sources {
        let raw = fs::read_to_string(&source.path)
            .map_err(|error| read_error(source.path.clone(), error))?;
        raws.push(raw);
    }

    let mut defs = ParsedDefs::default();
    for (source, raw) in sources.iter().zip(&raws) {
        parse_defs_document(&source.path, raw, &mut defs)?;
    }
    let catalog = assemble_catalog(defs, root)?;

    let input_hash = hash_xml_inputs(
        sources
            .iter()
            .zip(&raws)
            .map(|(source, raw)| (source.rel_path.as_str(), raw.as_str())),
    );
    info!(
        defs_path = %root.display(),
        xml_file_count = sources.len(),
        transformations = catalog.len(),
        input_hash = %input_hash,
        "content_compiled"
    );
    Ok(catalog)
}

/// Directory or single file, whichever `path` is.
pub fn compile_catalog_path(path: &Path) -> Result<Catalog, ContentCompileError> {
    if path.is_dir() {
        compile_catalog_dir(path)
    } else {
        compile_catalog_file(path)
    }
}

fn parse_defs_document(
    file_path: &Path,
    raw: &str,
    defs: &mut ParsedDefs,
) -> Result<(), ContentCompileError> {
    let doc = Document::parse(raw).map_err(|error| ContentCompileError {
        code: ContentErrorCode::XmlMalformed,
        message: format!("malformed XML: {error}"),
        file_path: file_path.to_path_buf(),
        location: Some(SourceLocation {
            line: error.pos().row as usize,
            column: error.pos().col as usize,
        }),
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != "Defs" {
        return Err(error_at_node(
            ContentErrorCode::InvalidRoot,
            "root element must be <Defs>".to_string(),
            file_path,
            &doc,
            root,
        ));
    }

    for child in root.children().filter(|node| node.is_element()) {
        match child.tag_name().name() {
            "WorldDef" => {
                if defs.world.is_some() {
                    return Err(error_at_node(
                        ContentErrorCode::DuplicateDef,
                        "duplicate <WorldDef>; a set of defs may describe one world only"
                            .to_string(),
                        file_path,
                        &doc,
                        child,
                    ));
                }
                defs.world = Some(parse_world_def(file_path, &doc, child)?);
            }
            "TransformationDef" => {
                let pending = parse_transformation_def(file_path, &doc, child)?;
                if defs
                    .transformations
                    .iter()
                    .any(|existing| existing.def_name == pending.def_name)
                {
                    return Err(error_at_node(
                        ContentErrorCode::DuplicateDef,
                        format!(
                            "duplicate TransformationDef '{}'; each defName may be defined once",
                            pending.def_name
                        ),
                        file_path,
                        &doc,
                        child,
                    ));
                }
                defs.transformations.push(pending);
            }
            other => {
                return Err(error_at_node(
                    ContentErrorCode::UnknownDefType,
                    format!(
                        "unsupported def type <{other}>; expected <WorldDef> or <TransformationDef>"
                    ),
                    file_path,
                    &doc,
                    child,
                ))
            }
        }
    }

    Ok(())
}

fn parse_world_def(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
) -> Result<PendingWorld, ContentCompileError> {
    let mut seen_fields = HashSet::<String>::new();
    let mut world = PendingWorld {
        file_path: file_path.to_path_buf(),
        location: Some(location_of(doc, node)),
        items: Vec::new(),
        zones: Vec::new(),
        zones_items: Vec::new(),
        start_zone: None,
        start_items: Vec::new(),
        start_zones_items: Vec::new(),
    };

    for field in node.children().filter(|child| child.is_element()) {
        let field_name = field.tag_name().name().to_string();
        // startZoneItems repeats once per zone.
        if field_name != "startZoneItems" && !seen_fields.insert(field_name.clone()) {
            return Err(error_at_node(
                ContentErrorCode::DuplicateField,
                format!("duplicate field <{}> in <WorldDef>", field_name),
                file_path,
                doc,
                field,
            ));
        }

        match field_name.as_str() {
            "items" => {
                world.items = text_list(file_path, doc, field, "item")?
                    .into_iter()
                    .map(Item::new)
                    .collect();
            }
            "zones" => {
                world.zones = text_list(file_path, doc, field, "zone")?
                    .into_iter()
                    .map(Zone::new)
                    .collect();
            }
            "zoneItems" => {
                world.zones_items = text_list(file_path, doc, field, "item")?
                    .into_iter()
                    .map(Item::new)
                    .collect();
            }
            "startZone" => {
                world.start_zone = Some(Zone::new(required_text(
                    file_path,
                    doc,
                    field,
                    "startZone",
                )?));
            }
            "startItems" => {
                world.start_items = parse_stacks(file_path, doc, field)?;
            }
            "startZoneItems" => {
                let zone = Zone::new(required_attr(file_path, doc, field, "zone")?);
                let stacks = parse_stacks(file_path, doc, field)?;
                world.start_zones_items.push((zone, stacks));
            }
            _ => {
                return Err(error_at_node(
                    ContentErrorCode::UnknownField,
                    format!("unknown field <{}> in <WorldDef>", field_name),
                    file_path,
                    doc,
                    field,
                ))
            }
        }
    }

    Ok(world)
}

fn parse_transformation_def(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
) -> Result<PendingTransformation, ContentCompileError> {
    let mut seen_fields = HashSet::<String>::new();
    let mut def_name: Option<String> = None;
    let mut builder = Transformation::builder();

    for field in node.children().filter(|child| child.is_element()) {
        let field_name = field.tag_name().name().to_string();
        if field_name != "changes" && !seen_fields.insert(field_name.clone()) {
            return Err(error_at_node(
                ContentErrorCode::DuplicateField,
                format!("duplicate field <{}> in <TransformationDef>", field_name),
                file_path,
                doc,
                field,
            ));
        }

        match field_name.as_str() {
            "defName" => {
                def_name = Some(required_text(file_path, doc, field, "defName")?);
            }
            "zones" => {
                let zones = text_list(file_path, doc, field, "zone")?;
                if zones.is_empty() {
                    return Err(error_at_node(
                        ContentErrorCode::MissingField,
                        "field <zones> must list at least one <zone>".to_string(),
                        file_path,
                        doc,
                        field,
                    ));
                }
                builder = builder.zones(zones.into_iter().map(Zone::new));
            }
            "destination" => {
                let zone = required_text(file_path, doc, field, "destination")?;
                builder = builder.destination(Zone::new(zone));
            }
            "changes" => {
                let owner = parse_owner(file_path, doc, field)?;
                for change in field.children().filter(|child| child.is_element()) {
                    let kind = match change.tag_name().name() {
                        "add" => ChangeKind::Add,
                        "remove" => ChangeKind::Remove,
                        "max" => ChangeKind::Max,
                        other => {
                            return Err(error_at_node(
                                ContentErrorCode::UnknownField,
                                format!(
                                    "unknown change <{other}> in <changes>; expected add, remove or max"
                                ),
                                file_path,
                                doc,
                                change,
                            ))
                        }
                    };
                    let stack = parse_stack(file_path, doc, change)?;
                    builder = builder.change(owner.clone(), kind, [stack]);
                }
            }
            _ => {
                return Err(error_at_node(
                    ContentErrorCode::UnknownField,
                    format!("unknown field <{}> in <TransformationDef>", field_name),
                    file_path,
                    doc,
                    field,
                ))
            }
        }
    }

    let Some(def_name) = def_name else {
        return Err(error_at_node(
            ContentErrorCode::MissingField,
            "missing required field <defName> in <TransformationDef>".to_string(),
            file_path,
            doc,
            node,
        ));
    };

    let transformation = builder.name(def_name.clone()).build().map_err(|error| {
        error_at_node(
            ContentErrorCode::Configuration,
            format!("TransformationDef '{def_name}': {error}"),
            file_path,
            doc,
            node,
        )
    })?;

    Ok(PendingTransformation {
        def_name,
        file_path: file_path.to_path_buf(),
        location: Some(location_of(doc, node)),
        transformation,
    })
}

/// `owner="player|current_zone|destination"` or `zone="<name>"`, exactly one of them.
fn parse_owner(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
) -> Result<InventoryOwner, ContentCompileError> {
    match (node.attribute("owner"), node.attribute("zone")) {
        (Some(token), None) => InventoryOwner::from_token(token.trim()).map_err(|error| {
            error_at_node(
                ContentErrorCode::InvalidValue,
                error.to_string(),
                file_path,
                doc,
                node,
            )
        }),
        (None, Some(zone)) if !zone.trim().is_empty() => {
            Ok(InventoryOwner::Zone(Zone::new(zone.trim())))
        }
        (None, Some(_)) => Err(error_at_node(
            ContentErrorCode::MissingField,
            "attribute zone must not be empty".to_string(),
            file_path,
            doc,
            node,
        )),
        (Some(_), Some(_)) => Err(error_at_node(
            ContentErrorCode::InvalidValue,
            "<changes> takes either owner or zone, not both".to_string(),
            file_path,
            doc,
            node,
        )),
        (None, None) => Err(error_at_node(
            ContentErrorCode::MissingField,
            "<changes> requires an owner or zone attribute".to_string(),
            file_path,
            doc,
            node,
        )),
    }
}

fn parse_stacks(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
) -> Result<Vec<ItemStack>, ContentCompileError> {
    let mut stacks = Vec::new();
    for child in node.children().filter(|child| child.is_element()) {
        if child.tag_name().name() != "stack" {
            return Err(error_at_node(
                ContentErrorCode::UnknownField,
                format!(
                    "unknown element <{}> in <{}>; expected <stack>",
                    child.tag_name().name(),
                    node.tag_name().name()
                ),
                file_path,
                doc,
                child,
            ));
        }
        stacks.push(parse_stack(file_path, doc, child)?);
    }
    Ok(stacks)
}

/// `item="<name>"` plus an optional `quantity` (default 1, must be >= 1).
fn parse_stack(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
) -> Result<ItemStack, ContentCompileError> {
    let item = required_attr(file_path, doc, node, "item")?;
    let quantity = match node.attribute("quantity") {
        None => 1,
        Some(value) => {
            let parsed = value.trim().parse::<u32>().map_err(|_| {
                error_at_node(
                    ContentErrorCode::InvalidValue,
                    format!("quantity '{}' is not a valid non-negative integer", value),
                    file_path,
                    doc,
                    node,
                )
            })?;
            if parsed == 0 {
                return Err(error_at_node(
                    ContentErrorCode::InvalidValue,
                    format!("quantity of '{}' must be >= 1", item),
                    file_path,
                    doc,
                    node,
                ));
            }
            parsed
        }
    };
    Ok(ItemStack::new(Item::new(item), quantity))
}

fn text_list(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
    child_tag: &str,
) -> Result<Vec<String>, ContentCompileError> {
    let mut values = Vec::new();
    for child in node.children().filter(|child| child.is_element()) {
        if child.tag_name().name() != child_tag {
            return Err(error_at_node(
                ContentErrorCode::UnknownField,
                format!(
                    "unknown element <{}> in <{}>; expected <{}>",
                    child.tag_name().name(),
                    node.tag_name().name(),
                    child_tag
                ),
                file_path,
                doc,
                child,
            ));
        }
        values.push(required_text(file_path, doc, child, child_tag)?);
    }
    Ok(values)
}

fn required_text(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
    field_name: &str,
) -> Result<String, ContentCompileError> {
    let value = node.text().map(str::trim).unwrap_or_default().to_string();
    if value.is_empty() {
        return Err(error_at_node(
            ContentErrorCode::MissingField,
            format!("field <{}> must not be empty", field_name),
            file_path,
            doc,
            node,
        ));
    }
    Ok(value)
}

fn required_attr(
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
    attr_name: &str,
) -> Result<String, ContentCompileError> {
    let value = node
        .attribute(attr_name)
        .map(str::trim)
        .unwrap_or_default()
        .to_string();
    if value.is_empty() {
        return Err(error_at_node(
            ContentErrorCode::MissingField,
            format!(
                "missing required attribute {} on <{}>",
                attr_name,
                node.tag_name().name()
            ),
            file_path,
            doc,
            node,
        ));
    }
    Ok(value)
}

fn assemble_catalog(defs: ParsedDefs, origin: &Path) -> Result<Catalog, ContentCompileError> {
    let mut sources = Vec::with_capacity(defs.transformations.len());
    let mut transformations = Vec::with_capacity(defs.transformations.len());
    for pending in defs.transformations {
        sources.push((pending.def_name, pending.file_path, pending.location));
        transformations.push(pending.transformation);
    }

    let world = match defs.world {
        Some(pending) => {
            let mut builder = World::builder()
                .items(pending.items)
                .zones(pending.zones)
                .zones_items(pending.zones_items)
                .with_transformations(&transformations)
                .start_items(pending.start_items);
            if let Some(zone) = pending.start_zone {
                builder = builder.start_zone(zone);
            }
            for (zone, stacks) in pending.start_zones_items {
                builder = builder.start_zone_items(zone, stacks);
            }
            builder.build().map_err(|error| ContentCompileError {
                code: ContentErrorCode::Configuration,
                message: format!("WorldDef: {error}"),
                file_path: pending.file_path,
                location: pending.location,
            })?
        }
        None => World::from_transformations(&transformations).map_err(|error| {
            ContentCompileError {
                code: ContentErrorCode::Configuration,
                message: error.to_string(),
                file_path: origin.to_path_buf(),
                location: None,
            }
        })?,
    };

    Catalog::new(world, transformations).map_err(|error| {
        let located = match &error {
            CatalogError::Build { name, .. } => sources
                .iter()
                .find(|(def_name, _, _)| def_name == name)
                .map(|(_, file_path, location)| (file_path.clone(), *location)),
            _ => None,
        };
        let (file_path, location) = located.unwrap_or_else(|| (origin.to_path_buf(), None));
        ContentCompileError {
            code: ContentErrorCode::Configuration,
            message: error.to_string(),
            file_path,
            location,
        }
    })
}

fn location_of(doc: &Document<'_>, node: Node<'_, '_>) -> SourceLocation {
    let pos = doc.text_pos_at(node.range().start);
    SourceLocation {
        line: pos.row as usize,
        column: pos.col as usize,
    }
}

fn error_at_node(
    code: ContentErrorCode,
    message: String,
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
) -> ContentCompileError {
    ContentCompileError {
        code,
        message,
        file_path: file_path.to_path_buf(),
        location: Some(location_of(doc, node)),
    }
}

fn read_error(path: PathBuf, source: std::io::Error) -> ContentCompileError {
    ContentCompileError {
        code: ContentErrorCode::ReadFile,
        message: format!("failed to read defs: {source}"),
        file_path: path,
        location: None,
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::catalog::{ActionId, StepOutcome};

    fn write_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(path, content).expect("write");
    }

    fn compile(raw: &str) -> Result<Catalog, ContentCompileError> {
        compile_catalog_str(raw, Path::new("defs.xml"))
    }

    const CAMP: &str = r#"<Defs>
  <WorldDef>
    <zones><zone>camp</zone><zone>forest</zone></zones>
    <startZone>forest</startZone>
    <startItems><stack item="axe"/></startItems>
    <startZoneItems zone="forest"><stack item="tree" quantity="2"/></startZoneItems>
  </WorldDef>
  <TransformationDef>
    <defName>chop</defName>
    <zones><zone>forest</zone></zones>
    <changes owner="player">
      <remove item="axe"/>
      <add item="axe"/>
      <add item="wood" quantity="3"/>
    </changes>
    <changes owner="current_zone"><remove item="tree"/></changes>
  </TransformationDef>
  <TransformationDef>
    <defName>go_camp</defName>
    <destination>camp</destination>
    <changes zone="forest"><add item="stump"/></changes>
  </TransformationDef>
</Defs>"#;

    #[test]
    fn valid_defs_compile_to_a_playable_catalog() {
        let catalog = compile(CAMP).expect("compile");
        assert_eq!(catalog.find("chop"), Some(ActionId(0)));
        assert_eq!(catalog.find("go_camp"), Some(ActionId(1)));

        let world = catalog.world();
        let zone_names = world.zones().iter().map(Zone::name).collect::<Vec<_>>();
        assert_eq!(zone_names, ["camp", "forest"]);
        assert_eq!(world.start_zone(), Some(&Zone::new("forest")));

        let chop = catalog.get(ActionId(0)).expect("chop");
        assert_eq!(chop.to_string(), "axe Zone(tree) > axe,wood[3]");

        let mut state = catalog.new_state();
        assert_eq!(state.position(), &[0, 1]);
        assert_eq!(
            catalog.step(&mut state, ActionId(0)).expect("chop"),
            StepOutcome::Applied
        );
        let wood = world.item_slot(&Item::new("wood")).expect("wood");
        assert_eq!(state.player_inventory()[wood], 3);
        assert_eq!(
            catalog.step(&mut state, ActionId(1)).expect("go"),
            StepOutcome::Applied
        );
        assert_eq!(state.position(), &[1, 0]);
    }

    #[test]
    fn missing_def_name_reports_file_and_location() {
        let err = compile(
            "<Defs>\n  <TransformationDef>\n    <zones><zone>forest</zone></zones>\n  </TransformationDef>\n</Defs>",
        )
        .expect_err("err");
        assert_eq!(err.code, ContentErrorCode::MissingField);
        assert_eq!(err.file_path, PathBuf::from("defs.xml"));
        assert_eq!(err.location, Some(SourceLocation { line: 2, column: 3 }));
    }

    #[test]
    fn unknown_field_errors() {
        let err = compile(
            r#"<Defs><TransformationDef><defName>a</defName><mood>Happy</mood></TransformationDef></Defs>"#,
        )
        .expect_err("err");
        assert_eq!(err.code, ContentErrorCode::UnknownField);
    }

    #[test]
    fn duplicate_field_errors() {
        let err = compile(
            r#"<Defs><TransformationDef><defName>a</defName><defName>b</defName></TransformationDef></Defs>"#,
        )
        .expect_err("err");
        assert_eq!(err.code, ContentErrorCode::DuplicateField);
    }

    #[test]
    fn malformed_owner_is_an_invalid_value() {
        let err = compile(
            r#"<Defs><TransformationDef><defName>a</defName><changes owner="inventory"><add item="x"/></changes></TransformationDef></Defs>"#,
        )
        .expect_err("err");
        assert_eq!(err.code, ContentErrorCode::InvalidValue);
        assert!(err.message.contains("inventory"));
    }

    #[test]
    fn owner_and_zone_are_exclusive() {
        let err = compile(
            r#"<Defs><TransformationDef><defName>a</defName><changes owner="player" zone="z"><add item="x"/></changes></TransformationDef></Defs>"#,
        )
        .expect_err("err");
        assert_eq!(err.code, ContentErrorCode::InvalidValue);
    }

    #[test]
    fn zero_or_garbage_quantity_is_rejected() {
        for quantity in ["0", "-2", "many"] {
            let raw = format!(
                r#"<Defs><TransformationDef><defName>a</defName><changes owner="player"><add item="x" quantity="{quantity}"/></changes></TransformationDef></Defs>"#
            );
            let err = compile(&raw).expect_err("err");
            assert_eq!(err.code, ContentErrorCode::InvalidValue, "quantity={quantity}");
        }
    }

    #[test]
    fn destination_changes_without_destination_compile() {
        let catalog = compile(
            r#"<Defs><TransformationDef><defName>a</defName><changes owner="destination"><remove item="x" quantity="2"/></changes></TransformationDef></Defs>"#,
        )
        .expect("compile");
        let transformation = catalog.get(ActionId(0)).expect("a");
        assert_eq!(transformation.to_string(), "Dest(x[2]) > ");
        assert_eq!(catalog.actions_mask(&catalog.new_state()).expect("mask"), [true]);
    }

    #[test]
    fn inconsistent_changes_report_their_def() {
        let err = compile(
            r#"<Defs><TransformationDef><defName>a</defName><changes owner="player"><add item="x"/><add item="x"/></changes></TransformationDef></Defs>"#,
        )
        .expect_err("err");
        assert_eq!(err.code, ContentErrorCode::Configuration);
        assert!(err.location.is_some());
    }

    #[test]
    fn malformed_xml_reports_location() {
        let err = compile(r#"<Defs><TransformationDef><defName>a</defName></Defs>"#)
            .expect_err("err");
        assert_eq!(err.code, ContentErrorCode::XmlMalformed);
        assert!(err.location.is_some());
    }

    #[test]
    fn root_and_def_types_are_checked() {
        let err = compile("<Things/>").expect_err("root");
        assert_eq!(err.code, ContentErrorCode::InvalidRoot);

        let err = compile("<Defs><EntityDef/></Defs>").expect_err("def type");
        assert_eq!(err.code, ContentErrorCode::UnknownDefType);
    }

    #[test]
    fn second_world_def_is_a_duplicate() {
        let err = compile("<Defs><WorldDef/><WorldDef/></Defs>").expect_err("err");
        assert_eq!(err.code, ContentErrorCode::DuplicateDef);
    }

    #[test]
    fn directory_compiles_in_sorted_order() {
        let temp = TempDir::new().expect("temp");
        write_file(
            &temp.path().join("b").join("later.xml"),
            r#"<Defs><TransformationDef><defName>second</defName><destination>b</destination></TransformationDef></Defs>"#,
        );
        write_file(
            &temp.path().join("a.xml"),
            r#"<Defs><TransformationDef><defName>first</defName><destination>a</destination></TransformationDef></Defs>"#,
        );
        write_file(&temp.path().join("readme.txt"), "not defs");

        let catalog = compile_catalog_dir(temp.path()).expect("compile");
        assert_eq!(catalog.find("first"), Some(ActionId(0)));
        assert_eq!(catalog.find("second"), Some(ActionId(1)));
        let zone_names = catalog
            .world()
            .zones()
            .iter()
            .map(Zone::name)
            .collect::<Vec<_>>();
        assert_eq!(zone_names, ["a", "b"]);
    }

    #[test]
    fn duplicate_def_across_files_names_the_later_file() {
        let temp = TempDir::new().expect("temp");
        let def = r#"<Defs><TransformationDef><defName>same</defName><destination>a</destination></TransformationDef></Defs>"#;
        write_file(&temp.path().join("one.xml"), def);
        write_file(&temp.path().join("two.xml"), def);

        let err = compile_catalog_path(temp.path()).expect_err("duplicate");
        assert_eq!(err.code, ContentErrorCode::DuplicateDef);
        assert!(err.file_path.ends_with("two.xml"));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let temp = TempDir::new().expect("temp");
        let err = compile_catalog_path(&temp.path().join("absent.xml")).expect_err("read");
        assert_eq!(err.code, ContentErrorCode::ReadFile);
        assert!(err.location.is_none());
    }
}
