//! 渲染资源组件
//!
//! 每个组件独占一个设备对象，创建时替换旧对象，drop 时释放且只释放一次：
//!
//! - `RootSignature`: 只允许输入布局的空根签名
//! - `Shader`: FXC / DXC 两种编译路径
//! - `VertexBuffer`: 上传堆上的顶点缓冲区及其视图
//! - `GraphicsPipeline`: 三角形管线状态对象
//! - `TriangleScene`: 把以上组件按启动顺序组装起来并记录每帧命令

pub mod frame;
pub mod pipeline;
pub mod root_signature;
pub mod shader;
pub mod vertex;
pub mod vertex_buffer;

pub use frame::TriangleScene;
pub use pipeline::GraphicsPipeline;
pub use root_signature::RootSignature;
pub use shader::Shader;
pub use vertex::Vertex;
pub use vertex_buffer::VertexBuffer;
