//! `list_email_template_files` handler.

use super::HandlerContext;
use crate::types::Result;

pub async fn list_email_template_files(ctx: HandlerContext<'_>) -> Result<Vec<String>> {
    let files = ctx.templates.list().await?;
    tracing::debug!(count = files.len(), "email template files");
    Ok(files)
}
