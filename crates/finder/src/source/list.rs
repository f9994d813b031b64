use super::Emitter;

pub(super) async fn produce(items: Vec<String>, emitter: &mut Emitter) {
	for item in items {
		if !emitter.emit(item).await {
			return;
		}
	}
}
