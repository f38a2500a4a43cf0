use crate::config;
use ignore::WalkBuilder;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_THEME_CSS: &str = include_str!("default_theme.css");

const DISCOVERY_DEPTH: usize = 4;
const CONFIG_FILE_NAME: &str = "tailwind.config.toml";

/// Handle into the utility engine, built once per run. The two variants are
/// selected during discovery and never re-branched on per call beyond the
/// dispatch below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesignContext {
    Legacy(LegacyContext),
    DesignSystem(DesignSystem),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyContext {
    colors: BTreeMap<String, BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignSystem {
    theme_variables: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub selector: String,
    pub declarations: Vec<(String, String)>,
    pub media: Option<String>,
}

impl Rule {
    pub fn render(&self) -> String {
        let body = self
            .declarations
            .iter()
            .map(|(property, value)| format!("{}: {};", property, value))
            .collect::<Vec<_>>()
            .join(" ");
        let rule = format!("{} {{ {} }}", self.selector, body);
        match &self.media {
            Some(condition) => format!("{} {{ {} }}", condition, rule),
            None => rule,
        }
    }
}

impl DesignContext {
    /// A marker stylesheet selects the design-system variant; otherwise a
    /// TOML config selects the legacy variant; neither means no engine.
    pub fn discover(workspace: &Path) -> Option<DesignContext> {
        if let Some(stylesheet) = find_marker_stylesheet(workspace) {
            if let Ok(css) = fs::read_to_string(&stylesheet) {
                return Some(DesignContext::DesignSystem(DesignSystem::from_stylesheet(
                    &css,
                )));
            }
        }
        if let Some(config_path) = find_config_file(workspace) {
            if let Ok(loaded) = config::load(&config_path) {
                return Some(DesignContext::Legacy(LegacyContext::from_config(&loaded)));
            }
        }
        None
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            DesignContext::Legacy(_) => "legacy-config",
            DesignContext::DesignSystem(_) => "design-system",
        }
    }

    pub fn rule_for(&self, token: &str) -> Option<Rule> {
        if token.is_empty() {
            return None;
        }
        let (variants, base) = split_variants(token);
        let declarations = self.base_declarations(base)?;

        let mut selector = format!(".{}", escape_selector(token));
        let mut media = None;
        for variant in &variants {
            match variant_kind(variant)? {
                VariantKind::Responsive(width) => {
                    media = Some(format!("@media (width >= {})", width));
                }
                VariantKind::Pseudo(pseudo) => selector.push_str(pseudo),
                VariantKind::Dark => {
                    media = Some("@media (prefers-color-scheme: dark)".to_string());
                }
            }
        }

        Some(Rule {
            selector,
            declarations,
            media,
        })
    }

    fn base_declarations(&self, base: &str) -> Option<Vec<(String, String)>> {
        if let Some(declarations) = static_utility(base) {
            return Some(declarations);
        }
        if let Some(declarations) = self.color_utility(base) {
            return Some(declarations);
        }
        if let Some(declarations) = self.text_size_utility(base) {
            return Some(declarations);
        }
        if let Some(declarations) = self.spacing_utility(base) {
            return Some(declarations);
        }
        self.sizing_utility(base)
    }

    fn color_utility(&self, base: &str) -> Option<Vec<(String, String)>> {
        let (namespace, rest) = split_color_namespace(base)?;
        if rest == "transparent" {
            return Some(vec![(namespace.property.to_string(), "transparent".to_string())]);
        }
        match self {
            DesignContext::DesignSystem(system) => {
                let variable = format!("--color-{}", rest);
                if !system.theme_variables.contains_key(&variable) {
                    return None;
                }
                Some(vec![(
                    namespace.property.to_string(),
                    format!("var({})", variable),
                )])
            }
            DesignContext::Legacy(context) => {
                let hex = context.lookup_color(rest)?;
                let (r, g, b) = parse_hex_color(&hex)?;
                Some(vec![
                    (namespace.opacity_variable.to_string(), "1".to_string()),
                    (
                        namespace.property.to_string(),
                        format!("rgb({} {} {} / var({}))", r, g, b, namespace.opacity_variable),
                    ),
                ])
            }
        }
    }

    fn text_size_utility(&self, base: &str) -> Option<Vec<(String, String)>> {
        let size = base.strip_prefix("text-")?;
        let (_, font_size, line_height) = TEXT_SIZES.iter().find(|(name, _, _)| *name == size)?;
        match self {
            DesignContext::DesignSystem(_) => Some(vec![(
                "font-size".to_string(),
                format!("var(--text-{})", size),
            )]),
            DesignContext::Legacy(_) => Some(vec![
                ("font-size".to_string(), (*font_size).to_string()),
                ("line-height".to_string(), (*line_height).to_string()),
            ]),
        }
    }

    fn spacing_utility(&self, base: &str) -> Option<Vec<(String, String)>> {
        let (prefix, raw) = base.rsplit_once('-')?;
        let properties = spacing_properties(prefix)?;
        let value = if raw == "px" {
            "1px".to_string()
        } else {
            let amount = parse_scale_amount(raw)?;
            self.scale_value(raw, amount)
        };
        Some(
            properties
                .iter()
                .map(|property| ((*property).to_string(), value.clone()))
                .collect(),
        )
    }

    fn sizing_utility(&self, base: &str) -> Option<Vec<(String, String)>> {
        let (prefix, raw) = base.split_once('-')?;
        let property = match prefix {
            "w" => "width",
            "h" => "height",
            _ => return None,
        };
        let value = match raw {
            "full" => "100%".to_string(),
            "auto" => "auto".to_string(),
            "screen" if property == "width" => "100vw".to_string(),
            "screen" => "100vh".to_string(),
            _ => {
                let amount = parse_scale_amount(raw)?;
                self.scale_value(raw, amount)
            }
        };
        Some(vec![(property.to_string(), value)])
    }

    fn scale_value(&self, raw: &str, amount: f64) -> String {
        match self {
            DesignContext::DesignSystem(_) => format!("calc(var(--spacing) * {})", raw),
            DesignContext::Legacy(_) => format!("{}rem", amount * 0.25),
        }
    }
}

impl DesignSystem {
    fn from_stylesheet(css: &str) -> Self {
        let mut theme_variables = parse_theme_variables(DEFAULT_THEME_CSS);
        for (name, value) in parse_theme_variables(css) {
            theme_variables.insert(name, value);
        }
        Self { theme_variables }
    }
}

impl LegacyContext {
    fn from_config(loaded: &config::Config) -> Self {
        let mut colors = default_palette();
        for (family, shades) in &loaded.theme.colors {
            let entry = colors.entry(family.clone()).or_default();
            for (shade, value) in shades {
                entry.insert(shade.clone(), value.clone());
            }
        }
        Self { colors }
    }

    fn lookup_color(&self, rest: &str) -> Option<String> {
        match rest {
            "white" => return Some("#ffffff".to_string()),
            "black" => return Some("#000000".to_string()),
            _ => {}
        }
        let (family, shade) = rest.rsplit_once('-')?;
        self.colors.get(family)?.get(shade).cloned()
    }
}

struct ColorNamespace {
    class_prefix: &'static str,
    property: &'static str,
    opacity_variable: &'static str,
}

const COLOR_NAMESPACES: [ColorNamespace; 3] = [
    ColorNamespace {
        class_prefix: "bg-",
        property: "background-color",
        opacity_variable: "--tw-bg-opacity",
    },
    ColorNamespace {
        class_prefix: "text-",
        property: "color",
        opacity_variable: "--tw-text-opacity",
    },
    ColorNamespace {
        class_prefix: "border-",
        property: "border-color",
        opacity_variable: "--tw-border-opacity",
    },
];

fn split_color_namespace(base: &str) -> Option<(&'static ColorNamespace, &str)> {
    for namespace in &COLOR_NAMESPACES {
        if let Some(rest) = base.strip_prefix(namespace.class_prefix) {
            return Some((namespace, rest));
        }
    }
    None
}

const TEXT_SIZES: [(&str, &str, &str); 8] = [
    ("xs", "0.75rem", "1rem"),
    ("sm", "0.875rem", "1.25rem"),
    ("base", "1rem", "1.5rem"),
    ("lg", "1.125rem", "1.75rem"),
    ("xl", "1.25rem", "1.75rem"),
    ("2xl", "1.5rem", "2rem"),
    ("3xl", "1.875rem", "2.25rem"),
    ("4xl", "2.25rem", "2.5rem"),
];

enum VariantKind {
    Responsive(&'static str),
    Pseudo(&'static str),
    Dark,
}

fn variant_kind(variant: &str) -> Option<VariantKind> {
    match variant {
        "sm" => Some(VariantKind::Responsive("40rem")),
        "md" => Some(VariantKind::Responsive("48rem")),
        "lg" => Some(VariantKind::Responsive("64rem")),
        "xl" => Some(VariantKind::Responsive("80rem")),
        "2xl" => Some(VariantKind::Responsive("96rem")),
        "hover" => Some(VariantKind::Pseudo(":hover")),
        "focus" => Some(VariantKind::Pseudo(":focus")),
        "focus-within" => Some(VariantKind::Pseudo(":focus-within")),
        "focus-visible" => Some(VariantKind::Pseudo(":focus-visible")),
        "active" => Some(VariantKind::Pseudo(":active")),
        "visited" => Some(VariantKind::Pseudo(":visited")),
        "disabled" => Some(VariantKind::Pseudo(":disabled")),
        "first" => Some(VariantKind::Pseudo(":first-child")),
        "last" => Some(VariantKind::Pseudo(":last-child")),
        "dark" => Some(VariantKind::Dark),
        _ => None,
    }
}

fn split_variants(token: &str) -> (Vec<&str>, &str) {
    let mut parts: Vec<&str> = token.split(':').collect();
    let base = parts.pop().unwrap_or(token);
    (parts, base)
}

fn static_utility(base: &str) -> Option<Vec<(String, String)>> {
    let declarations: &[(&str, &str)] = match base {
        "block" => &[("display", "block")],
        "inline-block" => &[("display", "inline-block")],
        "inline" => &[("display", "inline")],
        "flex" => &[("display", "flex")],
        "inline-flex" => &[("display", "inline-flex")],
        "grid" => &[("display", "grid")],
        "inline-grid" => &[("display", "inline-grid")],
        "hidden" => &[("display", "none")],
        "static" => &[("position", "static")],
        "fixed" => &[("position", "fixed")],
        "absolute" => &[("position", "absolute")],
        "relative" => &[("position", "relative")],
        "sticky" => &[("position", "sticky")],
        "flex-row" => &[("flex-direction", "row")],
        "flex-col" => &[("flex-direction", "column")],
        "flex-wrap" => &[("flex-wrap", "wrap")],
        "flex-nowrap" => &[("flex-wrap", "nowrap")],
        "items-start" => &[("align-items", "flex-start")],
        "items-center" => &[("align-items", "center")],
        "items-end" => &[("align-items", "flex-end")],
        "items-stretch" => &[("align-items", "stretch")],
        "justify-start" => &[("justify-content", "flex-start")],
        "justify-center" => &[("justify-content", "center")],
        "justify-end" => &[("justify-content", "flex-end")],
        "justify-between" => &[("justify-content", "space-between")],
        "justify-around" => &[("justify-content", "space-around")],
        "font-normal" => &[("font-weight", "400")],
        "font-medium" => &[("font-weight", "500")],
        "font-semibold" => &[("font-weight", "600")],
        "font-bold" => &[("font-weight", "700")],
        "italic" => &[("font-style", "italic")],
        "not-italic" => &[("font-style", "normal")],
        "underline" => &[("text-decoration-line", "underline")],
        "line-through" => &[("text-decoration-line", "line-through")],
        "no-underline" => &[("text-decoration-line", "none")],
        "uppercase" => &[("text-transform", "uppercase")],
        "lowercase" => &[("text-transform", "lowercase")],
        "capitalize" => &[("text-transform", "capitalize")],
        "normal-case" => &[("text-transform", "none")],
        "text-left" => &[("text-align", "left")],
        "text-center" => &[("text-align", "center")],
        "text-right" => &[("text-align", "right")],
        "truncate" => &[
            ("overflow", "hidden"),
            ("text-overflow", "ellipsis"),
            ("white-space", "nowrap"),
        ],
        "overflow-hidden" => &[("overflow", "hidden")],
        "overflow-auto" => &[("overflow", "auto")],
        "rounded" => &[("border-radius", "0.25rem")],
        "rounded-md" => &[("border-radius", "0.375rem")],
        "rounded-lg" => &[("border-radius", "0.5rem")],
        "rounded-full" => &[("border-radius", "9999px")],
        "border" => &[("border-style", "solid"), ("border-width", "1px")],
        "shadow" => &[(
            "box-shadow",
            "0 1px 3px 0 rgb(0 0 0 / 0.1), 0 1px 2px -1px rgb(0 0 0 / 0.1)",
        )],
        "cursor-pointer" => &[("cursor", "pointer")],
        "select-none" => &[("user-select", "none")],
        _ => return None,
    };
    Some(
        declarations
            .iter()
            .map(|(property, value)| ((*property).to_string(), (*value).to_string()))
            .collect(),
    )
}

fn spacing_properties(prefix: &str) -> Option<&'static [&'static str]> {
    let properties: &[&str] = match prefix {
        "p" => &["padding"],
        "px" => &["padding-inline"],
        "py" => &["padding-block"],
        "pt" => &["padding-top"],
        "pr" => &["padding-right"],
        "pb" => &["padding-bottom"],
        "pl" => &["padding-left"],
        "m" => &["margin"],
        "mx" => &["margin-inline"],
        "my" => &["margin-block"],
        "mt" => &["margin-top"],
        "mr" => &["margin-right"],
        "mb" => &["margin-bottom"],
        "ml" => &["margin-left"],
        "gap" => &["gap"],
        "gap-x" => &["column-gap"],
        "gap-y" => &["row-gap"],
        _ => return None,
    };
    Some(properties)
}

fn parse_scale_amount(raw: &str) -> Option<f64> {
    if raw.is_empty() || !raw.chars().all(|ch| ch.is_ascii_digit() || ch == '.') {
        return None;
    }
    raw.parse().ok()
}

fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if !digits.is_ascii() {
        return None;
    }
    let expanded = match digits.len() {
        3 => digits
            .chars()
            .flat_map(|ch| [ch, ch])
            .collect::<String>(),
        6 => digits.to_string(),
        _ => return None,
    };
    let r = u8::from_str_radix(&expanded[0..2], 16).ok()?;
    let g = u8::from_str_radix(&expanded[2..4], 16).ok()?;
    let b = u8::from_str_radix(&expanded[4..6], 16).ok()?;
    Some((r, g, b))
}

fn escape_selector(token: &str) -> String {
    let mut escaped = String::with_capacity(token.len());
    for ch in token.chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
            escaped.push(ch);
        } else {
            escaped.push('\\');
            escaped.push(ch);
        }
    }
    escaped
}

fn parse_theme_variables(css: &str) -> BTreeMap<String, String> {
    let mut variables = BTreeMap::new();
    for body in extract_theme_blocks(css) {
        for (name, value) in extract_variable_declarations(body) {
            variables.insert(name.to_string(), value.to_string());
        }
    }
    variables
}

fn extract_theme_blocks(css: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut cursor = 0usize;

    while let Some(rel_start) = css[cursor..].find("@theme") {
        let theme_idx = cursor + rel_start;
        let Some(open_rel) = css[theme_idx..].find('{') else {
            break;
        };
        let open_idx = theme_idx + open_rel;
        let Some(close_idx) = find_matching_brace(css, open_idx) else {
            break;
        };
        blocks.push(&css[open_idx + 1..close_idx]);
        cursor = close_idx + 1;
    }

    blocks
}

fn extract_variable_declarations(body: &str) -> Vec<(&str, &str)> {
    let mut declarations = Vec::new();
    let mut depth = 0usize;
    let mut segment_start = 0usize;

    for (idx, ch) in body.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ';' if depth == 0 => {
                let segment = body[segment_start..idx].trim();
                segment_start = idx + 1;
                let Some((name, value)) = segment.split_once(':') else {
                    continue;
                };
                let name = name.trim();
                let value = value.trim();
                if !name.starts_with("--") || value.is_empty() {
                    continue;
                }
                declarations.push((name, value));
            }
            _ => {}
        }
    }

    declarations
}

fn find_matching_brace(css: &str, open_idx: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, ch) in css[open_idx..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(open_idx + idx);
                }
            }
            _ => {}
        }
    }
    None
}

fn default_palette() -> BTreeMap<String, BTreeMap<String, String>> {
    let mut palette: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
    for (name, value) in parse_theme_variables(DEFAULT_THEME_CSS) {
        let Some(raw) = name.strip_prefix("--color-") else {
            continue;
        };
        let Some((family, shade)) = raw.rsplit_once('-') else {
            continue;
        };
        if !shade.chars().all(|ch| ch.is_ascii_digit()) {
            continue;
        }
        palette
            .entry(family.to_string())
            .or_default()
            .insert(shade.to_string(), value);
    }
    palette
}

fn find_marker_stylesheet(workspace: &Path) -> Option<PathBuf> {
    discover_file(workspace, |path, contents| {
        path.extension().and_then(|ext| ext.to_str()) == Some("css")
            && contents.is_some_and(has_marker_import)
    })
}

fn find_config_file(workspace: &Path) -> Option<PathBuf> {
    discover_file(workspace, |path, _| {
        path.file_name().and_then(|name| name.to_str()) == Some(CONFIG_FILE_NAME)
    })
}

fn discover_file(
    workspace: &Path,
    is_candidate: impl Fn(&Path, Option<&str>) -> bool,
) -> Option<PathBuf> {
    let mut candidates = Vec::new();

    let walker = WalkBuilder::new(workspace)
        .hidden(false)
        .max_depth(Some(DISCOVERY_DEPTH))
        .build();
    for entry in walker {
        let Ok(entry) = entry else { continue };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let path = entry.path();
        if path
            .components()
            .any(|component| matches!(component.as_os_str().to_str(), Some("node_modules" | "dist")))
        {
            continue;
        }
        let contents = if path.extension().and_then(|ext| ext.to_str()) == Some("css") {
            fs::read_to_string(path).ok()
        } else {
            None
        };
        if is_candidate(path, contents.as_deref()) {
            candidates.push(path.to_path_buf());
        }
    }

    candidates.sort();
    candidates.into_iter().next()
}

fn has_marker_import(css: &str) -> bool {
    css.lines().any(|line| marker_import_target(line).is_some())
}

fn marker_import_target(line: &str) -> Option<&'static str> {
    let rest = line.trim().strip_prefix("@import")?.trim_start();
    for target in [
        "tailwindcss/preflight",
        "tailwindcss/utilities",
        "tailwindcss/theme",
        "tailwindcss",
    ] {
        let double = format!("\"{}\"", target);
        let single = format!("'{}'", target);
        if rest.starts_with(&double) || rest.starts_with(&single) {
            return Some(target);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{DesignContext, DesignSystem, has_marker_import, parse_hex_color};
    use std::fs;

    fn design_system() -> DesignContext {
        DesignContext::DesignSystem(DesignSystem::from_stylesheet(""))
    }

    #[test]
    fn recognizes_static_utilities() {
        let context = design_system();
        let rule = context.rule_for("flex").expect("flex should resolve");
        assert_eq!(rule.selector, ".flex");
        assert_eq!(rule.declarations, vec![("display".to_string(), "flex".to_string())]);
        assert!(rule.media.is_none());
    }

    #[test]
    fn rejects_unknown_tokens_and_prefixed_output() {
        let context = design_system();
        assert!(context.rule_for("not-a-utility").is_none());
        assert!(context.rule_for("tw-flex").is_none());
        assert!(context.rule_for("").is_none());
    }

    #[test]
    fn generates_spacing_from_the_scale() {
        let context = design_system();
        let rule = context.rule_for("p-4").expect("p-4 should resolve");
        assert_eq!(
            rule.declarations,
            vec![("padding".to_string(), "calc(var(--spacing) * 4)".to_string())]
        );

        let gap = context.rule_for("gap-x-2").expect("gap-x-2 should resolve");
        assert_eq!(
            gap.declarations,
            vec![("column-gap".to_string(), "calc(var(--spacing) * 2)".to_string())]
        );

        assert!(context.rule_for("p-abc").is_none());
    }

    #[test]
    fn distinguishes_text_utilities() {
        let context = design_system();
        let size = context.rule_for("text-sm").expect("text-sm should resolve");
        assert_eq!(
            size.declarations,
            vec![("font-size".to_string(), "var(--text-sm)".to_string())]
        );

        let align = context.rule_for("text-center").expect("text-center should resolve");
        assert_eq!(
            align.declarations,
            vec![("text-align".to_string(), "center".to_string())]
        );

        let color = context.rule_for("text-red-500").expect("text-red-500 should resolve");
        assert_eq!(
            color.declarations,
            vec![("color".to_string(), "var(--color-red-500)".to_string())]
        );
    }

    #[test]
    fn wraps_responsive_variants_in_media_queries() {
        let context = design_system();
        let rule = context.rule_for("md:flex").expect("md:flex should resolve");
        assert_eq!(rule.selector, ".md\\:flex");
        assert_eq!(rule.media.as_deref(), Some("@media (width >= 48rem)"));

        let hover = context.rule_for("hover:underline").expect("hover variant");
        assert_eq!(hover.selector, ".hover\\:underline:hover");
        assert!(hover.media.is_none());

        assert!(context.rule_for("bogus:flex").is_none());
    }

    #[test]
    fn theme_blocks_extend_the_default_palette() {
        let css = "@import \"tailwindcss\";\n@theme {\n  --color-brand-500: #123456;\n}\n";
        let context = DesignContext::DesignSystem(DesignSystem::from_stylesheet(css));
        let rule = context.rule_for("bg-brand-500").expect("brand color");
        assert_eq!(
            rule.declarations,
            vec![(
                "background-color".to_string(),
                "var(--color-brand-500)".to_string()
            )]
        );
    }

    #[test]
    fn legacy_colors_render_flat_functional_form() {
        let dir = tempfile::tempdir().expect("tempdir");
        let _ = fs::write(
            dir.path().join("tailwind.config.toml"),
            "[theme.colors.brand]\n500 = \"#ff0000\"\n",
        );
        let context = DesignContext::discover(dir.path()).expect("legacy context");
        assert_eq!(context.variant_name(), "legacy-config");

        let rule = context.rule_for("bg-brand-500").expect("brand color");
        assert_eq!(
            rule.declarations,
            vec![
                ("--tw-bg-opacity".to_string(), "1".to_string()),
                (
                    "background-color".to_string(),
                    "rgb(255 0 0 / var(--tw-bg-opacity))".to_string()
                ),
            ]
        );

        let spacing = context.rule_for("p-4").expect("p-4 should resolve");
        assert_eq!(
            spacing.declarations,
            vec![("padding".to_string(), "1rem".to_string())]
        );
    }

    #[test]
    fn discovery_prefers_marker_stylesheet() {
        let dir = tempfile::tempdir().expect("tempdir");
        let _ = fs::write(dir.path().join("app.css"), "@import \"tailwindcss\";\n");
        let _ = fs::write(
            dir.path().join("tailwind.config.toml"),
            "[theme.colors.brand]\n500 = \"#ff0000\"\n",
        );
        let context = DesignContext::discover(dir.path()).expect("context");
        assert_eq!(context.variant_name(), "design-system");
    }

    #[test]
    fn discovery_ignores_dependency_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("node_modules/pkg");
        let _ = fs::create_dir_all(&nested);
        let _ = fs::write(nested.join("app.css"), "@import \"tailwindcss\";\n");
        assert!(DesignContext::discover(dir.path()).is_none());
    }

    #[test]
    fn marker_import_detection_matches_quoted_targets() {
        assert!(has_marker_import("@import \"tailwindcss\";\n"));
        assert!(has_marker_import("@import 'tailwindcss/theme';\n"));
        assert!(has_marker_import("h1 {}\n@import \"tailwindcss/utilities\";\n"));
        assert!(!has_marker_import("@import \"./other.css\";\n"));
        assert!(!has_marker_import(".tailwindcss { color: red; }\n"));
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(parse_hex_color("#ef4444"), Some((239, 68, 68)));
        assert_eq!(parse_hex_color("#fff"), Some((255, 255, 255)));
        assert_eq!(parse_hex_color("ef4444"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }

    #[test]
    fn renders_rules_with_media_wrapping() {
        let context = design_system();
        let rule = context.rule_for("md:hidden").expect("md:hidden");
        assert_eq!(
            rule.render(),
            "@media (width >= 48rem) { .md\\:hidden { display: none; } }"
        );
    }
}
