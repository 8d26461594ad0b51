//! Renderer collaborator: assembled specification -> source artifacts.
//!
//! Emits Java source text for the selected artifact families. Files are
//! produced into an in-memory set; the caller writes them only after the
//! whole run has succeeded, so a failed run never leaves a partial tree.

use std::collections::HashSet;
use std::path::PathBuf;

use once_cell::sync::Lazy;

use crate::assemble::{
    AssembledSpecification, BoundField, BoundOperation, ModelDef, ModelKind, OperationGroup,
};
use crate::config::{GeneratorConfiguration, GeneratorVariant, ModelVariant, Renderer};
use crate::mapper::{TargetType, Validation};
use crate::normalize::{HttpMethod, ParameterLocation};

#[derive(Debug, Clone)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub content: String,
}

static JAVA_RESERVED: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class",
        "const", "continue", "default", "do", "double", "else", "enum", "extends", "final",
        "finally", "float", "for", "goto", "if", "implements", "import", "instanceof", "int",
        "interface", "long", "native", "new", "package", "private", "protected", "public",
        "return", "short", "static", "strictfp", "super", "switch", "synchronized", "this",
        "throw", "throws", "transient", "try", "void", "volatile", "while",
    ]
    .into_iter()
    .collect()
});

/// Render every selected artifact family from the same specification.
pub fn render(
    assembled: &AssembledSpecification,
    config: &GeneratorConfiguration,
    contract_path: &std::path::Path,
    renderers: &[Renderer],
) -> Vec<GeneratedFile> {
    let model_package = config.model_package(contract_path);
    let api_package = format!("{}.api", config.base_package);

    let mut files = Vec::new();
    for renderer in renderers {
        match renderer {
            Renderer::Model => {
                for model in &assembled.models {
                    files.push(render_model(model, &model_package, config));
                }
            }
            Renderer::Client => {
                for group in &assembled.groups {
                    files.push(render_client(group, &api_package, config));
                }
            }
            Renderer::ServerStub => {
                for group in &assembled.groups {
                    files.push(render_server_stub(group, &api_package, config));
                }
            }
        }
    }
    files
}

// ------------------------------ Models ------------------------------------ //

fn render_model(
    model: &ModelDef,
    package: &str,
    config: &GeneratorConfiguration,
) -> GeneratedFile {
    let name = model.ty.name().to_string();
    let content = match &model.kind {
        ModelKind::Class { fields } => render_class(model, &name, fields, package, config),
        ModelKind::Enum { constants } => render_enum(model, &name, constants, package, config),
    };
    GeneratedFile {
        path: package_file(package, &name),
        content,
    }
}

fn render_class(
    model: &ModelDef,
    name: &str,
    fields: &[BoundField],
    package: &str,
    config: &GeneratorConfiguration,
) -> String {
    let mut imports = Vec::new();
    for field in fields {
        field.ty.imports(&mut imports);
        for v in &field.validations {
            validation_import(v, &mut imports);
        }
        if field.required {
            push_import(&mut imports, "jakarta.validation.constraints.NotNull");
        }
        if field.element_cascades {
            push_import(&mut imports, "jakarta.validation.Valid");
        }
    }
    match config.model_variant {
        ModelVariant::Jackson => {
            push_import(&mut imports, "com.fasterxml.jackson.annotation.JsonProperty");
        }
        ModelVariant::Gson => {
            push_import(&mut imports, "com.google.gson.annotations.SerializedName");
        }
    }
    imports.sort();

    let mut out = String::new();
    header(&mut out, package, &imports);
    if let Some(desc) = &model.description {
        doc_comment(&mut out, desc, "");
    }
    out.push_str(&format!("public class {name} {{\n"));

    for field in fields {
        let java_name = field_identifier(&field.name);
        out.push('\n');
        if let Some(desc) = &field.description {
            doc_comment(&mut out, desc, "    ");
        }
        match config.model_variant {
            ModelVariant::Jackson => {
                out.push_str(&format!(
                    "    @JsonProperty(\"{}\")\n",
                    escape_java_string(&field.name)
                ));
            }
            ModelVariant::Gson => {
                out.push_str(&format!(
                    "    @SerializedName(\"{}\")\n",
                    escape_java_string(&field.name)
                ));
            }
        }
        if field.required {
            out.push_str("    @NotNull\n");
        }
        for v in &field.validations {
            out.push_str(&format!("    {}\n", validation_annotation(v)));
        }
        out.push_str(&format!(
            "    private {} {java_name};\n",
            field_type_decl(field)
        ));
    }

    for field in fields {
        let java_name = field_identifier(&field.name);
        let ty = field_type_decl(field);
        let accessor = upper_first(&java_name);
        out.push_str(&format!(
            "\n    public {ty} get{accessor}() {{\n        return {java_name};\n    }}\n"
        ));
        out.push_str(&format!(
            "\n    public void set{accessor}({ty} {java_name}) {{\n        this.{java_name} = {java_name};\n    }}\n"
        ));
    }

    out.push_str("}\n");
    out
}

fn render_enum(
    model: &ModelDef,
    name: &str,
    constants: &[(String, String)],
    package: &str,
    config: &GeneratorConfiguration,
) -> String {
    let mut imports = Vec::new();
    match config.model_variant {
        ModelVariant::Jackson => {
            push_import(&mut imports, "com.fasterxml.jackson.annotation.JsonValue");
        }
        ModelVariant::Gson => {
            push_import(&mut imports, "com.google.gson.annotations.SerializedName");
        }
    }

    let mut out = String::new();
    header(&mut out, package, &imports);
    if let Some(desc) = &model.description {
        doc_comment(&mut out, desc, "");
    }
    out.push_str(&format!("public enum {name} {{\n"));
    for (i, (constant, original)) in constants.iter().enumerate() {
        let sep = if i + 1 == constants.len() { ";" } else { "," };
        match config.model_variant {
            ModelVariant::Jackson => {
                out.push_str(&format!(
                    "    {constant}(\"{}\"){sep}\n",
                    escape_java_string(original)
                ));
            }
            ModelVariant::Gson => {
                out.push_str(&format!(
                    "    @SerializedName(\"{}\")\n    {constant}(\"{}\"){sep}\n",
                    escape_java_string(original),
                    escape_java_string(original)
                ));
            }
        }
    }
    out.push_str("\n    private final String value;\n");
    out.push_str(&format!(
        "\n    {name}(String value) {{\n        this.value = value;\n    }}\n"
    ));
    match config.model_variant {
        ModelVariant::Jackson => {
            out.push_str(
                "\n    @JsonValue\n    public String getValue() {\n        return value;\n    }\n",
            );
        }
        ModelVariant::Gson => {
            out.push_str("\n    public String getValue() {\n        return value;\n    }\n");
        }
    }
    out.push_str("}\n");
    out
}

// ------------------------------ Operations -------------------------------- //

fn render_client(
    group: &OperationGroup,
    api_package: &str,
    config: &GeneratorConfiguration,
) -> GeneratedFile {
    let class = format!("{}Api", crate::mapper::fold_type_identifier(&group.tag));
    let mut imports = group_type_imports(group);

    let client_field = match config.generator_variant {
        Some(GeneratorVariant::Okhttp) => {
            push_import(&mut imports, "okhttp3.OkHttpClient");
            "private final OkHttpClient client;"
        }
        _ => {
            push_import(&mut imports, "org.springframework.web.client.RestTemplate");
            "private final RestTemplate client;"
        }
    };
    imports.sort();

    let mut out = String::new();
    header(&mut out, api_package, &imports);
    out.push_str(&format!("public class {class} {{\n\n"));
    out.push_str(&format!("    {client_field}\n"));
    out.push_str("    private final String basePath;\n");

    let ctor_param = match config.generator_variant {
        Some(GeneratorVariant::Okhttp) => "OkHttpClient client",
        _ => "RestTemplate client",
    };
    out.push_str(&format!(
        "\n    public {class}({ctor_param}, String basePath) {{\n        this.client = client;\n        this.basePath = basePath;\n    }}\n"
    ));

    for op in &group.operations {
        out.push('\n');
        operation_javadoc(&mut out, op);
        let ret = op
            .success_type()
            .map_or("void".to_string(), |ty| ty.declaration());
        out.push_str(&format!(
            "    public {ret} {}({}) {{\n",
            op.name,
            signature(op)
        ));
        out.push_str(&format!(
            "        String path = basePath + \"{}\";\n",
            escape_java_string(&op.path)
        ));
        for p in &op.parameters {
            if p.location == ParameterLocation::Path {
                let ident = field_identifier(&p.name);
                out.push_str(&format!(
                    "        path = path.replace(\"{{{}}}\", String.valueOf({ident}));\n",
                    escape_java_string(&p.name)
                ));
            }
        }
        let keyword = if ret == "void" { "" } else { "return " };
        out.push_str(&format!(
            "        {keyword}exchange(\"{}\", path{});\n",
            op.method.as_str(),
            if op.body.is_empty() { "" } else { ", body" }
        ));
        out.push_str("    }\n");
    }

    out.push_str(
        "\n    @SuppressWarnings(\"unchecked\")\n    private <T> T exchange(String method, String path, Object... body) {\n        throw new UnsupportedOperationException(\"transport adapter not configured\");\n    }\n",
    );
    out.push_str("}\n");

    GeneratedFile {
        path: package_file(api_package, &class),
        content: out,
    }
}

fn render_server_stub(
    group: &OperationGroup,
    api_package: &str,
    config: &GeneratorConfiguration,
) -> GeneratedFile {
    let interface = format!("{}Api", crate::mapper::fold_type_identifier(&group.tag));
    let mut imports = group_type_imports(group);
    let micronaut = matches!(config.generator_variant, Some(GeneratorVariant::Micronaut));
    if micronaut {
        push_import(&mut imports, "io.micronaut.http.annotation.*");
    } else {
        push_import(&mut imports, "org.springframework.web.bind.annotation.*");
    }
    push_import(&mut imports, "jakarta.validation.Valid");
    imports.sort();

    let mut out = String::new();
    header(&mut out, api_package, &imports);
    if micronaut {
        out.push_str("@Controller\n");
    }
    out.push_str(&format!("public interface {interface} {{\n"));

    for op in &group.operations {
        out.push('\n');
        operation_javadoc(&mut out, op);
        out.push_str(&format!(
            "    {}\n",
            mapping_annotation(op.method, &op.path, micronaut)
        ));
        let ret = op
            .success_type()
            .map_or("void".to_string(), |ty| ty.declaration());
        out.push_str(&format!(
            "    {ret} {}({});\n",
            op.name,
            annotated_signature(op, micronaut)
        ));
    }

    out.push_str("}\n");
    GeneratedFile {
        path: package_file(api_package, &interface),
        content: out,
    }
}

fn mapping_annotation(method: HttpMethod, path: &str, micronaut: bool) -> String {
    let escaped = escape_java_string(path);
    if micronaut {
        let ann = match method {
            HttpMethod::Get => "Get",
            HttpMethod::Put => "Put",
            HttpMethod::Post => "Post",
            HttpMethod::Delete => "Delete",
            HttpMethod::Options => "Options",
            HttpMethod::Head => "Head",
            HttpMethod::Patch => "Patch",
            HttpMethod::Trace => "Trace",
        };
        format!("@{ann}(\"{escaped}\")")
    } else {
        match method {
            HttpMethod::Get => format!("@GetMapping(\"{escaped}\")"),
            HttpMethod::Put => format!("@PutMapping(\"{escaped}\")"),
            HttpMethod::Post => format!("@PostMapping(\"{escaped}\")"),
            HttpMethod::Delete => format!("@DeleteMapping(\"{escaped}\")"),
            HttpMethod::Patch => format!("@PatchMapping(\"{escaped}\")"),
            other => format!(
                "@RequestMapping(method = RequestMethod.{}, path = \"{escaped}\")",
                other.as_str()
            ),
        }
    }
}

fn signature(op: &BoundOperation) -> String {
    let mut parts = Vec::new();
    for p in &op.parameters {
        parts.push(format!("{} {}", p.ty.declaration(), field_identifier(&p.name)));
    }
    if let Some(body) = op.body.first() {
        parts.push(format!("{} body", body.ty.declaration()));
    }
    parts.join(", ")
}

fn annotated_signature(op: &BoundOperation, micronaut: bool) -> String {
    let mut parts = Vec::new();
    for p in &op.parameters {
        let ann = match (p.location, micronaut) {
            (ParameterLocation::Path, false) => "@PathVariable",
            (ParameterLocation::Path, true) => "@PathVariable",
            (ParameterLocation::Query, false) => "@RequestParam",
            (ParameterLocation::Query, true) => "@QueryValue",
            (ParameterLocation::Header, false) => "@RequestHeader",
            (ParameterLocation::Header, true) => "@Header",
            (ParameterLocation::Cookie, false) => "@CookieValue",
            (ParameterLocation::Cookie, true) => "@CookieValue",
        };
        let cascade = if p.validations.contains(&Validation::NestedValid) {
            "@Valid "
        } else {
            ""
        };
        parts.push(format!(
            "{ann}(\"{}\") {cascade}{} {}",
            escape_java_string(&p.name),
            p.ty.declaration(),
            field_identifier(&p.name)
        ));
    }
    if let Some(body) = op.body.first() {
        let ann = if micronaut { "@Body" } else { "@RequestBody" };
        let cascade = if body.validations.contains(&Validation::NestedValid) {
            "@Valid "
        } else {
            ""
        };
        parts.push(format!("{ann} {cascade}{} body", body.ty.declaration()));
    }
    parts.join(", ")
}

fn group_type_imports(group: &OperationGroup) -> Vec<String> {
    let mut imports = Vec::new();
    for op in &group.operations {
        for p in &op.parameters {
            p.ty.imports(&mut imports);
        }
        for b in &op.body {
            b.ty.imports(&mut imports);
        }
        if let Some(ty) = op.success_type() {
            ty.imports(&mut imports);
        }
    }
    imports.retain(|i| !i.starts_with("java.lang."));
    imports
}

// ------------------------------ Shared helpers ---------------------------- //

fn header(out: &mut String, package: &str, imports: &[String]) {
    out.push_str(&format!("package {package};\n\n"));
    for import in imports {
        out.push_str(&format!("import {import};\n"));
    }
    if !imports.is_empty() {
        out.push('\n');
    }
}

fn doc_comment(out: &mut String, text: &str, indent: &str) {
    out.push_str(&format!("{indent}/**\n"));
    for line in text.lines() {
        out.push_str(&format!("{indent} * {line}\n"));
    }
    out.push_str(&format!("{indent} */\n"));
}

fn operation_javadoc(out: &mut String, op: &BoundOperation) {
    if let Some(summary) = op.summary.as_ref().or(op.description.as_ref()) {
        doc_comment(out, summary, "    ");
    }
}

fn validation_annotation(v: &Validation) -> String {
    match v {
        Validation::IntegralMin(min) => format!("@Min({min})"),
        Validation::IntegralMax(max) => format!("@Max({max})"),
        Validation::DecimalMin { value, inclusive } => {
            if *inclusive {
                format!("@DecimalMin(\"{}\")", value.0)
            } else {
                format!("@DecimalMin(value = \"{}\", inclusive = false)", value.0)
            }
        }
        Validation::DecimalMax { value, inclusive } => {
            if *inclusive {
                format!("@DecimalMax(\"{}\")", value.0)
            } else {
                format!("@DecimalMax(value = \"{}\", inclusive = false)", value.0)
            }
        }
        Validation::Size { min, max } => match (min, max) {
            (Some(min), Some(max)) => format!("@Size(min = {min}, max = {max})"),
            (Some(min), None) => format!("@Size(min = {min})"),
            (None, Some(max)) => format!("@Size(max = {max})"),
            (None, None) => "@Size".to_string(),
        },
        Validation::Pattern(regex) => {
            format!("@Pattern(regexp = \"{}\")", escape_java_string(regex))
        }
        Validation::NestedValid => "@Valid".to_string(),
    }
}

fn validation_import(v: &Validation, imports: &mut Vec<String>) {
    let import = match v {
        Validation::IntegralMin(_) => "jakarta.validation.constraints.Min",
        Validation::IntegralMax(_) => "jakarta.validation.constraints.Max",
        Validation::DecimalMin { .. } => "jakarta.validation.constraints.DecimalMin",
        Validation::DecimalMax { .. } => "jakarta.validation.constraints.DecimalMax",
        Validation::Size { .. } => "jakarta.validation.constraints.Size",
        Validation::Pattern(_) => "jakarta.validation.constraints.Pattern",
        Validation::NestedValid => "jakarta.validation.Valid",
    };
    push_import(imports, import);
}

fn push_import(imports: &mut Vec<String>, import: &str) {
    let import = import.to_string();
    if !imports.contains(&import) {
        imports.push(import);
    }
}

/// Declaration for a field, cascading into the element position of
/// containers when their element is an object type.
fn field_type_decl(field: &BoundField) -> String {
    if !field.element_cascades {
        return field.ty.declaration();
    }
    match field.ty.as_ref() {
        TargetType::Collection { name, element, .. } => {
            format!("{name}<@Valid {}>", element.declaration())
        }
        TargetType::Map { name, values, .. } => {
            format!("{name}<String, @Valid {}>", values.declaration())
        }
        TargetType::Basic { .. } => field.ty.declaration(),
    }
}

fn package_file(package: &str, class: &str) -> PathBuf {
    let mut path: PathBuf = package.split('.').collect();
    path.push(format!("{class}.java"));
    path
}

fn escape_java_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn camel(s: &str) -> String {
    let folded = crate::mapper::fold_type_identifier(s);
    let mut chars = folded.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => folded,
    }
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Legal Java field identifier for a property name.
fn field_identifier(name: &str) -> String {
    let candidate = camel(name);
    if JAVA_RESERVED.contains(candidate.as_str()) {
        format!("_{candidate}")
    } else {
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_words_are_escaped() {
        assert_eq!(field_identifier("class"), "_class");
        assert_eq!(field_identifier("pet-name"), "petName");
    }

    #[test]
    fn package_path_maps_to_directories() {
        assert_eq!(
            package_file("com.example.model", "Pet"),
            PathBuf::from("com/example/model/Pet.java")
        );
    }

    #[test]
    fn size_annotation_renders_partial_bounds() {
        assert_eq!(
            validation_annotation(&Validation::Size {
                min: Some(1),
                max: None
            }),
            "@Size(min = 1)"
        );
    }
}
