fn main() -> anyhow::Result<()> {
    gaze_capture_lib::run()
}
