//! CarbonMart 浏览器入口

use carbonmart_frontend::App;
use leptos::prelude::*;

// wasm 目标使用 lol_alloc 作为全局分配器以减小体积
#[cfg(target_arch = "wasm32")]
use lol_alloc::{AssumeSingleThreaded, FreeListAllocator};

#[cfg(target_arch = "wasm32")]
#[global_allocator]
static ALLOCATOR: AssumeSingleThreaded<FreeListAllocator> =
    unsafe { AssumeSingleThreaded::new(FreeListAllocator::new()) };

fn main() {
    // 日志后端由 App 根据配置安装，这里只接管 panic 输出
    console_error_panic_hook::set_once();
    mount_to_body(App);
}
