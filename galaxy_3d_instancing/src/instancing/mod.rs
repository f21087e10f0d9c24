//! Instanced collections: many proxies, one draw call per collection.

mod collection;
mod instance_collection;
mod instance_raycast_proxy;
mod packed_buffer;
mod point_collection;
mod point_raycast_proxy;
mod proxy;
mod registry;

pub use collection::{Collection, CollectionKey, InstancedCollection, Subscription, SyncReport};
pub use instance_collection::{InstanceCollection, InstanceCollectionDesc, COLOR_STRIDE, TRANSFORM_STRIDE};
pub use instance_raycast_proxy::InstanceRaycastProxy;
pub use packed_buffer::{BufferUsage, PackedBuffer};
pub use point_collection::{PointCollection, PointCollectionDesc, POSITION_STRIDE, SIZE_STRIDE};
pub use point_raycast_proxy::PointRaycastProxy;
pub use proxy::{ProxyHandle, ProxyKey};
pub use registry::ProxyRegistry;
