pub(crate) mod decode;
pub(crate) mod image_ref;
pub(crate) mod loader;
pub(crate) mod text;
