pub mod gltf_loader;
pub mod gpu_uploader;

pub use gltf_loader::UmbraGltfLoader;
pub use gpu_uploader::UmbraSceneGPUUploader;
