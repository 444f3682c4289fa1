//! Property tests for the shape algebra and matmul dispatch

mod common;

use common::create_cpu_client;
use numgrad::autograd::cat_tensors_backward;
use numgrad::dims::{infer_broadcast_shape, reduce_to_shape};
use numgrad::ops::matmul;
use numgrad::prelude::*;
use numgrad::runtime::shape_ops::{chunk, split};
use proptest::prelude::*;

fn shape(max_rank: usize) -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1usize..4, 0..=max_rank)
}

fn filled(shape: &[usize], device: &CpuDevice) -> Tensor<CpuRuntime> {
    let n: usize = shape.iter().product();
    let data: Vec<f64> = (0..n).map(|i| (i % 7) as f64 - 3.0).collect();
    Tensor::from_slice(&data, shape, device)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_broadcast_is_symmetric(a in shape(4), b in shape(4)) {
        match (infer_broadcast_shape(&a, &b), infer_broadcast_shape(&b, &a)) {
            (Ok(ab), Ok(ba)) => {
                prop_assert_eq!(ab.as_slice(), ba.as_slice());
                prop_assert_eq!(ab.len(), a.len().max(b.len()));
            }
            (Err(_), Err(_)) => {}
            (ab, ba) => prop_assert!(false, "asymmetric: {:?} vs {:?}", ab, ba),
        }
    }

    #[test]
    fn prop_broadcast_with_self_is_identity(a in shape(5)) {
        let r = infer_broadcast_shape(&a, &a).unwrap();
        prop_assert_eq!(r.as_slice(), a.as_slice());
    }

    /// Expanding a target shape and reducing back recovers the target, and
    /// every element of a summed ones-tensor counts the collapsed elements.
    #[test]
    fn prop_reduce_inverts_broadcast(
        dims in prop::collection::vec((1usize..3, 1usize..4), 0..4),
        leading in prop::collection::vec(1usize..4, 0..3),
    ) {
        let (client, device) = create_cpu_client();
        let target: Vec<usize> = dims.iter().map(|&(t, _)| t).collect();
        let mut source = leading.clone();
        source.extend(dims.iter().map(|&(t, e)| if t == 1 { e } else { t }));

        let ones = Tensor::<CpuRuntime>::ones(&source, DType::F64, &device);
        let reduced = reduce_to_shape(&client, &ones, &target).unwrap();
        prop_assert_eq!(reduced.shape(), target.as_slice());

        let source_numel: usize = source.iter().product();
        let target_numel: usize = target.iter().product();
        let count = (source_numel / target_numel) as f64;
        prop_assert!(reduced.to_vec::<f64>().iter().all(|&v| v == count));
    }

    #[test]
    fn prop_split_then_cat_round_trips(
        rows in 1usize..9,
        cols in 1usize..4,
        split_size in 1usize..5,
        dim in 0isize..2,
    ) {
        let (client, device) = create_cpu_client();
        let t = filled(&[rows, cols], &device);
        let pieces = split(&t, split_size, dim).unwrap();
        let refs: Vec<&Tensor<CpuRuntime>> = pieces.iter().collect();
        let joined = client.cat(&refs, dim).unwrap();
        prop_assert_eq!(joined.shape(), t.shape());
        prop_assert_eq!(joined.to_vec::<f64>(), t.to_vec::<f64>());

        // cat backward hands each piece its own slice of the gradient
        let sizes: Vec<Vec<usize>> = pieces.iter().map(|p| p.shape().to_vec()).collect();
        let grads = cat_tensors_backward(&t, &sizes, dim).unwrap();
        for (g, p) in grads.iter().zip(&pieces) {
            prop_assert_eq!(g.to_vec::<f64>(), p.to_vec::<f64>());
        }
    }

    /// Chunking and concatenating back is the identity, including when the
    /// chunked dimension is empty.
    #[test]
    fn prop_chunk_then_cat_round_trips(
        rows in 0usize..9,
        cols in 1usize..4,
        chunks in 1i64..6,
        dim in 0isize..2,
    ) {
        let (client, device) = create_cpu_client();
        let t = filled(&[rows, cols], &device);
        let pieces = chunk(&t, chunks, dim).unwrap();
        prop_assert!(pieces.len() as i64 <= chunks);
        let refs: Vec<&Tensor<CpuRuntime>> = pieces.iter().collect();
        let joined = client.cat(&refs, dim).unwrap();
        prop_assert_eq!(joined.shape(), t.shape());
        prop_assert_eq!(joined.to_vec::<f64>(), t.to_vec::<f64>());

        let sizes: Vec<Vec<usize>> = pieces.iter().map(|p| p.shape().to_vec()).collect();
        let grads = cat_tensors_backward(&t, &sizes, dim).unwrap();
        for (g, p) in grads.iter().zip(&pieces) {
            prop_assert_eq!(g.shape(), p.shape());
        }
    }

    /// The folded path and an explicitly batched product agree.
    #[test]
    fn prop_folded_matches_batched(
        b in 1usize..4,
        n in 1usize..4,
        k in 1usize..4,
        p in 1usize..4,
    ) {
        let (client, device) = create_cpu_client();
        let t1 = filled(&[b, n, k], &device);
        let t2 = filled(&[k, p], &device);

        let folded = matmul(&client, &t1, &t2).unwrap();
        let expanded = t2.unsqueeze(0).unwrap().broadcast_to(&[b, k, p]).unwrap();
        let batched = matmul(&client, &t1, &expanded).unwrap();

        prop_assert_eq!(folded.shape(), &[b, n, p][..]);
        prop_assert_eq!(folded.shape(), batched.shape());
        prop_assert_eq!(folded.to_vec::<f64>(), batched.to_vec::<f64>());
    }

    /// A vector operand behaves like a 1-row / 1-column matrix with that
    /// dimension dropped.
    #[test]
    fn prop_vector_operands_match_matrix_form(n in 1usize..5, k in 1usize..5) {
        let (client, device) = create_cpu_client();
        let m = filled(&[n, k], &device);
        let v = filled(&[k], &device);

        let mv = matmul(&client, &m, &v).unwrap();
        let mm = matmul(&client, &m, &v.unsqueeze(-1).unwrap()).unwrap();
        prop_assert_eq!(mv.shape(), &[n][..]);
        prop_assert_eq!(mv.to_vec::<f64>(), mm.to_vec::<f64>());

        let mt = m.t().unwrap();
        let vm = matmul(&client, &v, &mt).unwrap();
        prop_assert_eq!(vm.shape(), &[n][..]);
        prop_assert_eq!(vm.to_vec::<f64>(), mv.to_vec::<f64>());
    }
}
