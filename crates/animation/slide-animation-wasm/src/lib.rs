use js_sys::{Function, JSON};
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use slide_animation_core::{
    parse_slide_animations_json_with, AnimationEngine, Config, ElementSpec, Outputs,
    PlaybackMode,
};
use slide_deck::{NavigationGate, Pager};

#[wasm_bindgen]
pub struct SlideAnimation {
    core: AnimationEngine,
    gate: NavigationGate,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

/// JS numbers to whole milliseconds; negative and NaN become 0.
fn ms_from_js(ms: f64) -> u64 {
    if ms.is_finite() && ms > 0.0 {
        ms.round() as u64
    } else {
        0
    }
}

/// Page changes are reported to the host through the returned action string.
struct HostPager;

impl Pager for HostPager {
    fn change_slide(&mut self) {}
    fn exit_fullscreen(&mut self) {}
}

/// Exceptions thrown by JS subscribers are swallowed so the engine keeps going.
fn call_quietly(f: &Function, args: &[JsValue]) {
    let _ = match args {
        [] => f.call0(&JsValue::UNDEFINED),
        [a] => f.call1(&JsValue::UNDEFINED, a),
        [a, b, ..] => f.call2(&JsValue::UNDEFINED, a, b),
    };
}

fn to_js<T: serde::Serialize>(value: &T, what: &str) -> Result<JsValue, JsError> {
    swb::to_value(value).map_err(|e| JsError::new(&format!("{what} error: {e}")))
}

#[wasm_bindgen]
impl SlideAnimation {
    /// Create an engine for one slide. Pass a JSON config object or undefined/null for defaults.
    /// Example:
    ///   new SlideAnimation({ mode: "sequential", group_completion: "pointer" })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<SlideAnimation, JsError> {
        console_error_panic_hook::set_once();

        let cfg: Config = if jsvalue_is_undefined_or_null(&config) {
            Config::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };

        Ok(SlideAnimation {
            core: AnimationEngine::new(cfg),
            gate: NavigationGate::default(),
        })
    }

    /// Register an element. `spec` is `{ enter?, emphasis?, exit?, group? }` with
    /// descriptors `{ type, duration, delay?, order? }`; `handle` is echoed in changes.
    #[wasm_bindgen(js_name = add_element)]
    pub fn add_element(
        &mut self,
        id: String,
        spec: JsValue,
        handle: Option<String>,
    ) -> Result<(), JsError> {
        let spec: ElementSpec = if jsvalue_is_undefined_or_null(&spec) {
            ElementSpec::default()
        } else {
            swb::from_value(spec).map_err(|e| JsError::new(&format!("element spec error: {e}")))?
        };
        self.core.add_element_with_handle(id, handle, spec);
        Ok(())
    }

    /// Register every element of a slide manifest and start playback.
    /// Descriptors may omit `duration`; the configured phase defaults apply.
    #[wasm_bindgen(js_name = load_slide)]
    pub fn load_slide(&mut self, manifest: JsValue) -> Result<(), JsError> {
        if jsvalue_is_undefined_or_null(&manifest) {
            return Err(JsError::new("load_slide: manifest is null/undefined"));
        }
        let s = JSON::stringify(&manifest)
            .map_err(|e| JsError::new(&format!("load_slide stringify error: {:?}", e)))?
            .as_string()
            .ok_or_else(|| JsError::new("load_slide: stringify produced non-string"))?;
        let slide = parse_slide_animations_json_with(&s, self.core.config())
            .map_err(|e| JsError::new(&format!("load_slide parse error: {e}")))?;
        slide.apply(&mut self.core);
        Ok(())
    }

    /// "parallel" or "sequential".
    #[wasm_bindgen(js_name = set_mode)]
    pub fn set_mode(&mut self, mode: &str) -> Result<(), JsError> {
        let mode = match mode {
            "parallel" => PlaybackMode::Parallel,
            "sequential" => PlaybackMode::Sequential,
            other => return Err(JsError::new(&format!("unknown mode '{other}'"))),
        };
        self.core.set_mode(mode);
        Ok(())
    }

    pub fn start(&mut self) {
        self.core.start();
    }

    #[wasm_bindgen(js_name = start_grouped)]
    pub fn start_grouped(&mut self) {
        self.core.start_grouped();
    }

    #[wasm_bindgen(js_name = next_group)]
    pub fn next_group(&mut self) {
        self.core.next_group();
    }

    pub fn emphasis(&mut self) {
        self.core.emphasis();
    }

    pub fn exit(&mut self) {
        self.core.exit();
    }

    pub fn skip(&mut self) {
        self.core.skip();
    }

    pub fn reset(&mut self) {
        self.core.reset();
    }

    /// Advance the virtual clock by `dt_ms` milliseconds. Returns Outputs JSON.
    pub fn advance(&mut self, dt_ms: f64) -> Result<JsValue, JsError> {
        let out: Outputs = self.core.advance(ms_from_js(dt_ms));
        to_js(&out, "outputs")
    }

    /// Fire every pending completion. Returns Outputs JSON.
    #[wasm_bindgen(js_name = run_until_idle)]
    pub fn run_until_idle(&mut self) -> Result<JsValue, JsError> {
        let out: Outputs = self.core.run_until_idle();
        to_js(&out, "outputs")
    }

    #[wasm_bindgen(js_name = is_all_groups_complete)]
    pub fn is_all_groups_complete(&self) -> bool {
        self.core.is_all_groups_complete()
    }

    #[wasm_bindgen(js_name = get_current_group)]
    pub fn get_current_group(&self) -> u32 {
        self.core.get_current_group() as u32
    }

    #[wasm_bindgen(js_name = get_total_groups)]
    pub fn get_total_groups(&self) -> u32 {
        self.core.get_total_groups() as u32
    }

    #[wasm_bindgen(js_name = is_enter_complete)]
    pub fn is_enter_complete(&self) -> bool {
        self.core.is_enter_complete()
    }

    #[wasm_bindgen(js_name = is_emphasis_complete)]
    pub fn is_emphasis_complete(&self) -> bool {
        self.core.is_emphasis_complete()
    }

    #[wasm_bindgen(js_name = is_exit_complete)]
    pub fn is_exit_complete(&self) -> bool {
        self.core.is_exit_complete()
    }

    #[wasm_bindgen(js_name = has_emphasis)]
    pub fn has_emphasis(&self) -> bool {
        self.core.has_emphasis()
    }

    #[wasm_bindgen(js_name = has_exit)]
    pub fn has_exit(&self) -> bool {
        self.core.has_exit()
    }

    /// Visual state name ("hidden", "entering", ...) or undefined for unknown ids.
    #[wasm_bindgen(js_name = element_state)]
    pub fn element_state(&self, id: &str) -> Option<String> {
        self.core.element_state(id).map(|s| s.name().to_string())
    }

    #[wasm_bindgen(js_name = on_enter_complete)]
    pub fn on_enter_complete(&mut self, cb: Function) {
        self.core.on_enter_complete(move || call_quietly(&cb, &[]));
    }

    #[wasm_bindgen(js_name = on_emphasis_complete)]
    pub fn on_emphasis_complete(&mut self, cb: Function) {
        self.core.on_emphasis_complete(move || call_quietly(&cb, &[]));
    }

    #[wasm_bindgen(js_name = on_exit_complete)]
    pub fn on_exit_complete(&mut self, cb: Function) {
        self.core.on_exit_complete(move || call_quietly(&cb, &[]));
    }

    /// `cb(group, isLastGroup)`
    #[wasm_bindgen(js_name = on_group_complete)]
    pub fn on_group_complete(&mut self, cb: Function) {
        self.core.on_group_complete(move |group, is_last| {
            call_quietly(&cb, &[JsValue::from(group), JsValue::from_bool(is_last)])
        });
    }

    /// Group-only gate. Returns "animation", "page-change" or "blocked"; the host
    /// performs the page change itself.
    #[wasm_bindgen(js_name = handle_advance)]
    pub fn handle_advance(&mut self) -> Result<JsValue, JsError> {
        let outcome = self.gate.handle_advance(Some(&mut self.core), &mut HostPager);
        to_js(&outcome, "outcome")
    }

    /// Primary "next" gate. Returns "advance-group", "emphasis", "exit",
    /// "change-slide", "exit-fullscreen" or "blocked". Engine actions are
    /// performed here; page actions are left to the host.
    #[wasm_bindgen(js_name = handle_next)]
    pub fn handle_next(&mut self, at_last_slide: bool) -> Result<JsValue, JsError> {
        let action = self
            .gate
            .handle_next(Some(&mut self.core), at_last_slide, &mut HostPager);
        to_js(&action, "action")
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
