pub mod automount;
pub mod mount;
pub mod remote;

pub use automount::{disable_automount, enable_automount, is_automount_enabled, unit_name};
pub use mount::{is_remote_mounted, mount_remote, open_in_file_manager, unmount_remote};
pub use remote::{
    create_from_form, create_remote, create_remote_with_options, delete_remote, rename_remote,
};
