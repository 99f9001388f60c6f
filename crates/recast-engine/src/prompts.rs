//! Generation request construction
//!
//! Every request states the response contract the parser in `recast-llm`
//! expects: either the `INSTRUCTIONS:` marker, or sections of
//! "filename, fenced code block" separated by `---` lines. The prompt text
//! here is deliberately minimal; the engine's behavior depends on the
//! contract, not the phrasing.

use crate::context::MigrationContext;

/// Sentinel a dependency query returns when a file has no dependencies.
pub const NO_DEPENDENCIES: &str = "NONE";

const CODE_CONTRACT: &str = "Respond with one section per file: the filename on its own line, \
then the code in a fenced block tagged with its language. Separate sections with a line \
containing only `---`. If there is nothing to write, start your response with `INSTRUCTIONS:` \
followed by guidance for the operator.";

fn header(ctx: &MigrationContext) -> String {
    let mut out = format!(
        "You are migrating a {} project to {}.",
        ctx.source_lang, ctx.target_lang
    );
    if !ctx.guidelines.is_empty() {
        out.push_str("\nGuidelines: ");
        out.push_str(&ctx.guidelines);
    }
    out
}

/// Query for third-party package dependencies of one file.
pub(crate) fn external_deps(ctx: &MigrationContext, file: &str, content: &str) -> String {
    format!(
        "{}\n\nList the external dependencies (third-party packages) of the file below as a \
comma-separated list of package names. Respond with `{NO_DEPENDENCIES}` if there are none.\n\n\
File: {file}\n```\n{content}\n```",
        header(ctx)
    )
}

/// Query for same-tree file dependencies of one file.
pub(crate) fn internal_deps(
    ctx: &MigrationContext,
    file: &str,
    content: &str,
    near_tree: &str,
) -> String {
    format!(
        "{}\n\nList the internal dependencies (other files in this source tree) of the file \
below as comma-separated paths relative to the source root. Respond with `{NO_DEPENDENCIES}` \
if there are none.\n\nDirectory structure:\n{near_tree}\n\nFile: {file}\n```\n{content}\n```",
        header(ctx)
    )
}

/// Translation request for one file.
pub(crate) fn translate(
    ctx: &MigrationContext,
    file: &str,
    content: &str,
    external_deps: &[String],
    migrated_deps: &[String],
    target_tree: &str,
) -> String {
    format!(
        "{}\n\nTranslate the {} file below into {}. External dependencies: [{}]. Already \
migrated dependency files to import from: [{}]. Existing target directory structure (avoid \
name collisions):\n{}\n\nFile: {file}\n```\n{content}\n```\n\n{CODE_CONTRACT}",
        header(ctx),
        ctx.source_lang,
        ctx.target_lang,
        external_deps.join(", "),
        migrated_deps.join(", "),
        target_tree,
    )
}

/// Test-generation request for one source file's visible behavior.
pub(crate) fn generate_test(
    ctx: &MigrationContext,
    file: &str,
    source_content: &str,
    target_tree: &str,
) -> String {
    format!(
        "{}\n\nWrite tests exercising the externally visible behavior (e.g. endpoints) of \
{file} against http://localhost:{}. The tests must exit non-zero on failure.\n\nOriginal \
file:\n```\n{source_content}\n```\n\nTarget directory structure:\n{target_tree}\n\n\
{CODE_CONTRACT}",
        header(ctx),
        ctx.target_port,
    )
}

/// Repair request scoped to application code.
pub(crate) fn repair_code(
    ctx: &MigrationContext,
    failure: &str,
    relevant: &str,
    target_tree: &str,
) -> String {
    format!(
        "{}\n\nFix the migrated {} code so the failing operation succeeds. Failure \
output:\n```\n{failure}\n```\n\nRelevant files:\n{relevant}\nTarget directory \
structure:\n{target_tree}\n\nRewrite only the files that need to change. {CODE_CONTRACT}",
        header(ctx),
        ctx.target_lang,
    )
}

/// Repair request scoped to a generated test artifact.
pub(crate) fn repair_test(ctx: &MigrationContext, failure: &str, test_name: &str, test_content: &str) -> String {
    format!(
        "{}\n\nFix the generated test file {test_name} so it correctly expresses the expected \
behavior. Failure output:\n```\n{failure}\n```\n\nCurrent test \
file:\n```\n{test_content}\n```\n\n{CODE_CONTRACT}",
        header(ctx)
    )
}

/// Container-manifest generation for the target tree.
pub(crate) fn dockerfile(ctx: &MigrationContext, target_tree: &str) -> String {
    format!(
        "{}\n\nWrite a Dockerfile (filename `Dockerfile`) for a {} {} app exposing port {}. \
Target directory structure:\n{target_tree}\n\n{CODE_CONTRACT}",
        header(ctx),
        ctx.operating_system,
        ctx.target_lang,
        ctx.target_port,
    )
}

/// Dependency-manifest generation from the accumulated external names.
pub(crate) fn dependency_manifest(
    ctx: &MigrationContext,
    dockerfile_content: &str,
    external_deps: &[String],
    target_tree: &str,
) -> String {
    format!(
        "{}\n\nWrite the dependencies file this Dockerfile needs (e.g. package.json or \
requirements.txt) covering: [{}].\n\nDockerfile:\n```\n{dockerfile_content}\n```\n\nTarget \
directory structure:\n{target_tree}\n\n{CODE_CONTRACT}",
        header(ctx),
        external_deps.join(", "),
    )
}

/// Dockerfile refinement against the generated dependencies file.
pub(crate) fn refine_dockerfile(
    ctx: &MigrationContext,
    dockerfile_content: &str,
    manifest_name: &str,
    manifest_content: &str,
) -> String {
    format!(
        "{}\n\nRefine this Dockerfile (filename `Dockerfile`) so it installs from \
{manifest_name}.\n\nDockerfile:\n```\n{dockerfile_content}\n```\n\n{manifest_name}:\n```\n\
{manifest_content}\n```\n\n{CODE_CONTRACT}",
        header(ctx)
    )
}
