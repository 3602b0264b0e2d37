use anyhow::Result;
use esp_idf_sys::{esp, esp_vfs_spiffs_conf_t, esp_vfs_spiffs_register};
use log::info;

/// Mount the `storage` SPIFFS partition at `/spiffs`, formatting it on the
/// first boot.
pub fn mount_spiffs() -> Result<()> {
    let conf = esp_vfs_spiffs_conf_t {
        base_path: c"/spiffs".as_ptr(),
        partition_label: c"storage".as_ptr(),
        max_files: 4,
        format_if_mount_failed: true,
    };
    esp!(unsafe { esp_vfs_spiffs_register(&conf) })?;
    info!("SPIFFS mounted at /spiffs");
    Ok(())
}
