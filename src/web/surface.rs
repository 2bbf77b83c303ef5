use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use gloo_events::EventListener;
use gloo_timers::callback::Timeout;
use js_sys::{Function, JSON};
use wasm_bindgen::prelude::*;
use web_sys::{window, CustomEvent, CustomEventInit};

use super::environment::BrowserEnvironment;
use super::load_config;
use crate::schedule::TimerSlot;
use crate::isolation::{NavigationIntent, RenderFault};
use crate::surface::{SurfaceController, SurfaceEffect};

/// Event dispatched on `window` when a failed surface asks to leave the page.
pub const NAVIGATE_EVENT: &str = "folio:navigate";

/// Browser host for a [`SurfaceController`].
///
/// Effects are delivered to the `on_effect` callback as plain objects. Timers
/// and the resize listener live inside the surface and are released by
/// `unmount()` or by dropping it (`free()` from JavaScript).
#[wasm_bindgen]
pub struct WasmSurface {
    host: Rc<RefCell<SurfaceHost>>,
}

struct SurfaceHost {
    controller: SurfaceController,
    probe: BrowserEnvironment,
    on_effect: Function,
    timer: TimerSlot<Timeout>,
    resize_listener: Option<EventListener>,
}

#[wasm_bindgen]
impl WasmSurface {
    #[wasm_bindgen(constructor)]
    pub fn new(on_effect: Function, config_json: Option<String>) -> Result<WasmSurface, JsValue> {
        let config = load_config(config_json)?;
        let probe = BrowserEnvironment::new()?;
        let host = Rc::new(RefCell::new(SurfaceHost {
            controller: SurfaceController::new(&config),
            probe,
            on_effect,
            timer: TimerSlot::new(),
            resize_listener: None,
        }));

        let weak = Rc::downgrade(&host);
        let listener = EventListener::new(host.borrow().probe.window(), "resize", move |_| {
            if let Some(host) = weak.upgrade() {
                drive(&host, |host, now| host.controller.resize(&host.probe, now));
            }
        });
        host.borrow_mut().resize_listener = Some(listener);

        drive(&host, |host, now| host.controller.mount(&host.probe, now));
        Ok(Self { host })
    }

    /// Called by the graphics engine once its assets are ready.
    pub fn loaded(&self) {
        drive(&self.host, |host, now| host.controller.loaded(now));
    }

    /// Reports an engine exception.
    pub fn fault(&self, message: String) {
        drive(&self.host, |host, now| {
            host.controller.fault(RenderFault::Engine(message), now)
        });
    }

    #[wasm_bindgen(js_name = contextLost)]
    pub fn context_lost(&self) {
        drive(&self.host, |host, now| {
            host.controller.fault(RenderFault::ContextLost, now)
        });
    }

    #[wasm_bindgen(js_name = resourceFailed)]
    pub fn resource_failed(&self, url: String) {
        drive(&self.host, |host, now| {
            host.controller
                .fault(RenderFault::ResourceFetch { url }, now)
        });
    }

    pub fn unmount(&self) {
        let mut host = self.host.borrow_mut();
        host.controller.unmount();
        host.timer.clear();
        host.resize_listener = None;
    }
}

impl Drop for WasmSurface {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Runs one controller step, re-arms the deadline timer and delivers the
/// effects after the borrow is released so callbacks may re-enter.
fn drive<F>(host: &Rc<RefCell<SurfaceHost>>, step: F)
where
    F: FnOnce(&mut SurfaceHost, Duration) -> Vec<SurfaceEffect>,
{
    let now = now();
    let (effects, on_effect) = {
        let mut state = host.borrow_mut();
        let effects = step(&mut *state, now);
        arm_timer(&mut *state, Rc::downgrade(host), now);
        (effects, state.on_effect.clone())
    };
    for effect in effects {
        deliver(&on_effect, &effect);
    }
}

/// Replaces the pending timeout. At most one timeout is scheduled per surface.
fn arm_timer(state: &mut SurfaceHost, host: Weak<RefCell<SurfaceHost>>, now: Duration) {
    let Some(deadline) = state.controller.next_deadline() else {
        state.timer.clear();
        return;
    };
    let delay = deadline.saturating_sub(now).as_millis().min(u32::MAX as u128) as u32;
    state.timer.arm(Timeout::new(delay, move || {
        if let Some(host) = host.upgrade() {
            release_fired_timer(&host);
            drive(&host, |host, now| host.controller.tick(now));
        }
    }));
}

/// Detaches the timeout whose callback is running. Its closure cannot be
/// freed while it executes, so it is forgotten instead of dropped.
fn release_fired_timer(host: &RefCell<SurfaceHost>) {
    if let Some(fired) = host.borrow_mut().timer.take_fired() {
        let _ = fired.forget();
    }
}

fn deliver(on_effect: &Function, effect: &SurfaceEffect) {
    if let SurfaceEffect::Navigate { intent } = effect {
        dispatch_navigation(*intent);
    }
    let payload = match serde_json::to_string(effect) {
        Ok(json) => json,
        Err(err) => {
            log::error!("failed to serialize surface effect: {err}");
            return;
        }
    };
    let value = match JSON::parse(&payload) {
        Ok(value) => value,
        Err(err) => {
            log::error!("failed to build effect object: {err:?}");
            return;
        }
    };
    if let Err(err) = on_effect.call1(&JsValue::NULL, &value) {
        log::error!("surface effect callback threw: {err:?}");
    }
}

fn dispatch_navigation(intent: NavigationIntent) {
    let Some(window) = window() else {
        return;
    };
    let init = CustomEventInit::new();
    init.set_detail(&JsValue::from_str(intent.path()));
    match CustomEvent::new_with_event_init_dict(NAVIGATE_EVENT, &init) {
        Ok(event) => {
            if let Err(err) = window.dispatch_event(&event) {
                log::error!("failed to dispatch {NAVIGATE_EVENT}: {err:?}");
            }
        }
        Err(err) => log::error!("failed to create {NAVIGATE_EVENT}: {err:?}"),
    }
}

fn now() -> Duration {
    let millis = window()
        .and_then(|window| window.performance())
        .map(|performance| performance.now())
        .unwrap_or_else(js_sys::Date::now);
    Duration::from_secs_f64(millis.max(0.0) / 1000.0)
}
