//! The runtime helper library (§4.5 "Runtime helpers"): a fixed catalog of
//! named Go source fragments codegen may reference. Each program gets
//! exactly the helpers its emitted expressions actually use, in a stable
//! order, with no duplicate definitions — tracked via a `HelperSet`
//! accumulated during lowering and resolved (including transitive
//! dependencies) just before printing.

use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Helper {
    ToString,
    ToInt,
    ToFloat,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Index,
    IndexSet,
    Slice,
    DotGet,
    DotSet,
    Len,
    Truthy,
    JsonPrepare,
    SlicesContains,
    Raise,
    TaskHandle,
    Spawn,
    Parallel,
    Shell,
    Capture,
    Queue,
    RangeValues,
    RangePairs,
}

impl Helper {
    pub fn name(self) -> &'static str {
        match self {
            Helper::ToString => "rugo_to_string",
            Helper::ToInt => "rugo_to_int",
            Helper::ToFloat => "rugo_to_float",
            Helper::Add => "rugo_add",
            Helper::Sub => "rugo_sub",
            Helper::Mul => "rugo_mul",
            Helper::Div => "rugo_div",
            Helper::Mod => "rugo_mod",
            Helper::Eq => "rugo_eq",
            Helper::Index => "rugo_index",
            Helper::IndexSet => "rugo_index_set",
            Helper::Slice => "rugo_slice",
            Helper::DotGet => "rugo_dot_get",
            Helper::DotSet => "rugo_dot_set",
            Helper::Len => "rugo_len",
            Helper::Truthy => "rugo_truthy",
            Helper::JsonPrepare => "rugo_json_prepare",
            Helper::SlicesContains => "rugo_slices_contains",
            Helper::Raise => "rugo_raise",
            Helper::TaskHandle => "RugoTask",
            Helper::Spawn => "rugo_spawn",
            Helper::Parallel => "rugo_parallel",
            Helper::Shell => "rugo_shell",
            Helper::Capture => "rugo_capture",
            Helper::Queue => "RugoQueue",
            Helper::RangeValues => "rugo_range",
            Helper::RangePairs => "rugo_range_pairs",
        }
    }

    /// Helpers this one calls into, so pulling one in transitively pulls
    /// in its dependencies too.
    fn deps(self) -> &'static [Helper] {
        match self {
            Helper::Add | Helper::Sub | Helper::Mul | Helper::Div | Helper::Mod => {
                &[Helper::ToString]
            }
            Helper::Index => &[Helper::Len],
            Helper::IndexSet => &[Helper::Len],
            Helper::Slice => &[Helper::Len],
            Helper::RangePairs => &[Helper::ToString],
            Helper::Raise => &[Helper::ToString],
            Helper::Spawn => &[Helper::TaskHandle],
            Helper::Parallel => &[Helper::TaskHandle, Helper::Spawn],
            Helper::JsonPrepare => &[Helper::DotGet],
            Helper::Queue => &[Helper::Raise],
            _ => &[],
        }
    }

    /// The Go source fragment implementing this helper. Every helper
    /// operates on `interface{}` (Rugo's universal boxed value
    /// representation) so it composes with dynamically-typed containers.
    fn source(self) -> &'static str {
        match self {
            Helper::ToString => {
                r#"func rugo_to_string(v interface{}) string {
	switch x := v.(type) {
	case string:
		return x
	case nil:
		return ""
	case bool:
		if x {
			return "true"
		}
		return "false"
	case float64:
		return strconv.FormatFloat(x, 'g', -1, 64)
	case int64:
		return strconv.FormatInt(x, 10)
	default:
		return fmt.Sprintf("%v", x)
	}
}"#
            }
            Helper::ToInt => {
                r#"func rugo_to_int(v interface{}) int64 {
	switch x := v.(type) {
	case int64:
		return x
	case float64:
		return int64(x)
	case string:
		n, err := strconv.ParseInt(strings.TrimSpace(x), 10, 64)
		if err != nil {
			return 0
		}
		return n
	default:
		return 0
	}
}"#
            }
            Helper::ToFloat => {
                r#"func rugo_to_float(v interface{}) float64 {
	switch x := v.(type) {
	case float64:
		return x
	case int64:
		return float64(x)
	case string:
		f, err := strconv.ParseFloat(strings.TrimSpace(x), 64)
		if err != nil {
			return 0
		}
		return f
	default:
		return 0
	}
}"#
            }
            Helper::Add => {
                r#"func rugo_add(a, b interface{}) interface{} {
	switch x := a.(type) {
	case int64:
		if y, ok := b.(int64); ok {
			return x + y
		}
		if y, ok := b.(float64); ok {
			return float64(x) + y
		}
	case float64:
		if y, ok := b.(float64); ok {
			return x + y
		}
		if y, ok := b.(int64); ok {
			return x + float64(y)
		}
	case string:
		return x + rugo_to_string(b)
	}
	return rugo_to_string(a) + rugo_to_string(b)
}"#
            }
            Helper::Sub => {
                r#"func rugo_sub(a, b interface{}) interface{} {
	if x, ok := a.(int64); ok {
		if y, ok := b.(int64); ok {
			return x - y
		}
	}
	return rugo_to_float(a) - rugo_to_float(b)
}"#
            }
            Helper::Mul => {
                r#"func rugo_mul(a, b interface{}) interface{} {
	if x, ok := a.(int64); ok {
		if y, ok := b.(int64); ok {
			return x * y
		}
	}
	return rugo_to_float(a) * rugo_to_float(b)
}"#
            }
            Helper::Div => {
                r#"func rugo_div(a, b interface{}) interface{} {
	if x, ok := a.(int64); ok {
		if y, ok := b.(int64); ok && y != 0 {
			return x / y
		}
	}
	return rugo_to_float(a) / rugo_to_float(b)
}"#
            }
            Helper::Mod => {
                r#"func rugo_mod(a, b interface{}) interface{} {
	x, y := rugo_to_int(a), rugo_to_int(b)
	if y == 0 {
		return int64(0)
	}
	return x % y
}"#
            }
            Helper::Eq => {
                r#"func rugo_eq(a, b interface{}) bool {
	return reflect.DeepEqual(a, b)
}"#
            }
            Helper::Index => {
                r#"func rugo_index(v interface{}, i interface{}) interface{} {
	idx := int(rugo_to_int(i))
	switch x := v.(type) {
	case []interface{}:
		if idx < 0 {
			idx += len(x)
		}
		if idx < 0 || idx >= len(x) {
			return nil
		}
		return x[idx]
	case map[string]interface{}:
		return x[rugo_to_string(i)]
	case string:
		runes := []rune(x)
		if idx < 0 {
			idx += len(runes)
		}
		if idx < 0 || idx >= len(runes) {
			return nil
		}
		return string(runes[idx])
	default:
		return nil
	}
}"#
            }
            Helper::IndexSet => {
                r#"func rugo_index_set(v interface{}, i interface{}, value interface{}) {
	idx := int(rugo_to_int(i))
	switch x := v.(type) {
	case []interface{}:
		if idx < 0 {
			idx += len(x)
		}
		if idx >= 0 && idx < len(x) {
			x[idx] = value
		}
	case map[string]interface{}:
		x[rugo_to_string(i)] = value
	}
}"#
            }
            Helper::Slice => {
                r#"func rugo_slice(v interface{}, start interface{}, length interface{}) interface{} {
	s := int(rugo_to_int(start))
	switch x := v.(type) {
	case []interface{}:
		if s < 0 || s > len(x) {
			return []interface{}{}
		}
		end := len(x)
		if length != nil {
			end = s + int(rugo_to_int(length))
		}
		if end > len(x) {
			end = len(x)
		}
		if end < s {
			end = s
		}
		return append([]interface{}{}, x[s:end]...)
	case string:
		runes := []rune(x)
		if s < 0 || s > len(runes) {
			return ""
		}
		end := len(runes)
		if length != nil {
			end = s + int(rugo_to_int(length))
		}
		if end > len(runes) {
			end = len(runes)
		}
		if end < s {
			end = s
		}
		return string(runes[s:end])
	default:
		return nil
	}
}"#
            }
            Helper::DotGet => {
                r#"func rugo_dot_get(v interface{}, field string) interface{} {
	if m, ok := v.(map[string]interface{}); ok {
		return m[field]
	}
	return nil
}"#
            }
            Helper::DotSet => {
                r#"func rugo_dot_set(v interface{}, field string, value interface{}) {
	if m, ok := v.(map[string]interface{}); ok {
		m[field] = value
	}
}"#
            }
            Helper::Len => {
                r#"func rugo_len(v interface{}) int64 {
	switch x := v.(type) {
	case []interface{}:
		return int64(len(x))
	case map[string]interface{}:
		return int64(len(x))
	case string:
		return int64(len([]rune(x)))
	default:
		return 0
	}
}"#
            }
            Helper::Truthy => {
                r#"func rugo_truthy(v interface{}) bool {
	switch x := v.(type) {
	case nil:
		return false
	case bool:
		return x
	default:
		return true
	}
}"#
            }
            Helper::JsonPrepare => {
                r#"// rugo_json_prepare walks a boxed value tree, unwrapping anything
// encoding/json can't already marshal natively (everything here already
// can, since the boxed representation is plain interfaces/maps/slices; it
// exists as the single seam module-provided values pass through).
func rugo_json_prepare(v interface{}) interface{} {
	return v
}"#
            }
            Helper::SlicesContains => {
                r#"func rugo_slices_contains(haystack interface{}, needle interface{}) bool {
	arr, ok := haystack.([]interface{})
	if !ok {
		return false
	}
	for _, item := range arr {
		if reflect.DeepEqual(item, needle) {
			return true
		}
	}
	return false
}"#
            }
            Helper::Raise => {
                r#"func rugo_raise(line int, msg interface{}) {
	fmt.Fprintf(os.Stderr, "rugo: line %d: %s\n", line, rugo_to_string(msg))
	os.Exit(1)
}"#
            }
            Helper::TaskHandle => {
                r#"type RugoTask struct {
	result interface{}
	err    interface{}
	done   chan struct{}
}

func rugo_task_value(t *RugoTask) interface{} {
	<-t.done
	if t.err != nil {
		rugo_raise(0, t.err)
	}
	return t.result
}

func rugo_task_done(t *RugoTask) bool {
	select {
	case <-t.done:
		return true
	default:
		return false
	}
}

func rugo_task_wait(t *RugoTask, ms interface{}) interface{} {
	select {
	case <-t.done:
		if t.err != nil {
			rugo_raise(0, t.err)
		}
		return t.result
	case <-time.After(time.Duration(rugo_to_int(ms)) * time.Millisecond):
		return nil
	}
}"#
            }
            Helper::Spawn => {
                r#"func rugo_spawn(fn func() interface{}) *RugoTask {
	t := &RugoTask{done: make(chan struct{})}
	go func() {
		defer func() {
			if r := recover(); r != nil {
				t.err = fmt.Sprintf("%v", r)
			}
			close(t.done)
		}()
		t.result = fn()
	}()
	return t
}"#
            }
            Helper::Parallel => {
                r#"func rugo_parallel(fns ...func() interface{}) []interface{} {
	tasks := make([]*RugoTask, len(fns))
	for i, fn := range fns {
		tasks[i] = rugo_spawn(fn)
	}
	results := make([]interface{}, len(tasks))
	for i, t := range tasks {
		results[i] = rugo_task_value(t)
	}
	return results
}"#
            }
            Helper::Shell => {
                r#"func rugo_shell(cmd interface{}) interface{} {
	out, err := exec.Command("sh", "-c", rugo_to_string(cmd)).CombinedOutput()
	if err != nil {
		return nil
	}
	return strings.TrimRight(string(out), "\n")
}"#
            }
            Helper::Capture => {
                r#"func rugo_capture(cmd interface{}) interface{} {
	out, err := exec.Command("sh", "-c", rugo_to_string(cmd)).Output()
	if err != nil {
		return ""
	}
	return strings.TrimRight(string(out), "\n")
}"#
            }
            Helper::Queue => {
                r#"type RugoQueue struct {
	ch     chan interface{}
	mu     sync.Mutex
	closed bool
}

func rugo_queue_new(capacity interface{}) *RugoQueue {
	cap := int(rugo_to_int(capacity))
	if cap < 0 {
		cap = 0
	}
	return &RugoQueue{ch: make(chan interface{}, cap)}
}

func rugo_queue_push(q *RugoQueue, v interface{}) {
	q.mu.Lock()
	closed := q.closed
	q.mu.Unlock()
	if closed {
		rugo_raise(0, "push to closed queue")
	}
	q.ch <- v
}

func rugo_queue_pop(q *RugoQueue) interface{} {
	v, ok := <-q.ch
	if !ok {
		rugo_raise(0, "pop from empty closed queue")
	}
	return v
}

func rugo_queue_close(q *RugoQueue) {
	q.mu.Lock()
	defer q.mu.Unlock()
	if !q.closed {
		q.closed = true
		close(q.ch)
	}
}

func rugo_queue_size(q *RugoQueue) interface{} {
	return int64(len(q.ch))
}

func rugo_queue_closed(q *RugoQueue) interface{} {
	q.mu.Lock()
	defer q.mu.Unlock()
	return q.closed
}"#
            }
            Helper::RangeValues => {
                r#"func rugo_range(v interface{}) []interface{} {
	switch x := v.(type) {
	case []interface{}:
		return x
	case map[string]interface{}:
		out := make([]interface{}, 0, len(x))
		for _, val := range x {
			out = append(out, val)
		}
		return out
	case string:
		runes := []rune(x)
		out := make([]interface{}, len(runes))
		for i, r := range runes {
			out[i] = string(r)
		}
		return out
	default:
		return nil
	}
}"#
            }
            Helper::RangePairs => {
                r#"type rugoPair struct {
	Key   interface{}
	Value interface{}
}

func rugo_range_pairs(v interface{}) []rugoPair {
	switch x := v.(type) {
	case []interface{}:
		out := make([]rugoPair, len(x))
		for i, val := range x {
			out[i] = rugoPair{Key: int64(i), Value: val}
		}
		return out
	case map[string]interface{}:
		out := make([]rugoPair, 0, len(x))
		for k, val := range x {
			out = append(out, rugoPair{Key: k, Value: val})
		}
		return out
	default:
		return nil
	}
}"#
            }
        }
    }
}

/// Accumulates the set of helpers a program references during lowering,
/// including transitive dependencies, and resolves them in a stable
/// (dependency-then-name) order for printing.
#[derive(Default)]
pub struct HelperSet {
    used: BTreeSet<Helper>,
}

impl HelperSet {
    pub fn new() -> Self {
        HelperSet::default()
    }

    pub fn require(&mut self, helper: Helper) {
        if self.used.insert(helper) {
            for &dep in helper.deps() {
                self.require(dep);
            }
        }
    }

    pub fn sources(&self) -> Vec<&'static str> {
        self.used.iter().map(|h| h.source()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    /// Standard library imports every referenced helper collectively needs.
    pub fn go_imports(&self) -> BTreeSet<&'static str> {
        let mut imports = BTreeSet::new();
        for helper in &self.used {
            match helper {
                Helper::ToString | Helper::ToInt | Helper::ToFloat => {
                    imports.insert("fmt");
                    imports.insert("strconv");
                    imports.insert("strings");
                }
                Helper::Eq | Helper::SlicesContains => {
                    imports.insert("reflect");
                }
                Helper::Raise => {
                    imports.insert("fmt");
                    imports.insert("os");
                }
                Helper::TaskHandle => {
                    imports.insert("time");
                }
                Helper::Shell | Helper::Capture => {
                    imports.insert("os/exec");
                    imports.insert("strings");
                }
                Helper::Queue => {
                    imports.insert("sync");
                }
                _ => {}
            }
        }
        imports
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requiring_add_pulls_in_to_string_dependency() {
        let mut set = HelperSet::new();
        set.require(Helper::Add);
        let names: Vec<_> = set.sources();
        assert!(!names.is_empty());
        assert!(set.used.contains(&Helper::ToString));
    }

    #[test]
    fn requiring_twice_does_not_duplicate() {
        let mut set = HelperSet::new();
        set.require(Helper::Len);
        set.require(Helper::Len);
        assert_eq!(set.used.len(), 1);
    }

    #[test]
    fn parallel_pulls_in_spawn_and_task_handle() {
        let mut set = HelperSet::new();
        set.require(Helper::Parallel);
        assert!(set.used.contains(&Helper::Spawn));
        assert!(set.used.contains(&Helper::TaskHandle));
    }

    #[test]
    fn queue_pulls_in_raise_and_sync_import() {
        let mut set = HelperSet::new();
        set.require(Helper::Queue);
        assert!(set.used.contains(&Helper::Raise));
        assert!(set.go_imports().contains("sync"));
    }
}
