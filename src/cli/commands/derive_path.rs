//! Derive-path command implementation

use crate::core::folder::FolderKeyDeriver;
use crate::domain::{FolderId, FolderKey};
use clap::Args;

/// Arguments for the derive-path command
#[derive(Args, Debug)]
pub struct DerivePathArgs {
    /// Parent prefix, e.g. `Folio/Categories`
    pub prefix: String,

    /// Folder token of the resource
    pub folder_id: String,

    /// Role segment (image, cover, document, gallery)
    pub role: String,
}

impl DerivePathArgs {
    /// Execute the derive-path command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        match self.derive() {
            Ok(key) => {
                println!("{key}");
                Ok(0)
            }
            Err(e) => {
                println!("❌ {e}");
                Ok(5)
            }
        }
    }

    fn derive(&self) -> Result<FolderKey, String> {
        let parent = FolderKey::new(self.prefix.as_str())?;
        let folder_id = FolderId::new(self.folder_id.as_str())?;
        let deriver = FolderKeyDeriver::new(parent.as_str()).map_err(|e| e.to_string())?;
        deriver
            .derive(&parent, &folder_id, &self.role)
            .map_err(|e| e.to_string())
    }
}
